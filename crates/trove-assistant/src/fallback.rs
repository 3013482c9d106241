//! Canned replies used whenever the hosted model is unreachable or
//! unconfigured. Keyword matching only; no state.

const TOPICS: &[(&str, &str)] = &[
    (
        "register",
        "To create an account, click 'Register' in the top menu, enter your username, email, \
         and password. After registration, you can start buying and selling items!",
    ),
    (
        "sell",
        "To sell an item, log in and click 'Sell Item' or the '+' button. Fill in the product \
         details including title, category, description, price, and upload an image.",
    ),
    (
        "buy",
        "To buy an item, browse products on the homepage, click on items you like, and add them \
         to your cart. Then go to your cart and click 'Checkout' to complete the purchase.",
    ),
    (
        "search",
        "Use the search bar on the homepage to find products by keywords, or use the category \
         filter to browse specific types of items.",
    ),
    (
        "cart",
        "Your cart icon in the top menu shows items you've added. Click it to view, remove \
         items, or proceed to checkout.",
    ),
    (
        "account",
        "Access your account dashboard from the user menu to edit your profile, change \
         password, or view your purchase history.",
    ),
    (
        "listings",
        "Manage your product listings from 'My Listings' where you can edit, delete, or view \
         your posted items.",
    ),
];

const DEFAULT_REPLY: &str = "Hello! I'm the Trove assistant. I can help you with buying and \
     selling second-hand items on our marketplace. What would you like to know about?";

const DEFAULT_HELP: &str = "I can help you with registration, selling items, buying products, \
     searching, managing your cart, account settings, and product listings. What would you \
     like to know?";

/// Static reply for a known help topic.
pub fn quick_help(topic: &str) -> &'static str {
    TOPICS
        .iter()
        .find(|(name, _)| *name == topic)
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_HELP)
}

/// Keyword-matched reply for a free-form message.
pub fn keyword_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    let matches = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if matches(&["register", "sign up", "account"]) {
        quick_help("register")
    } else if matches(&["sell", "list", "post"]) {
        quick_help("sell")
    } else if matches(&["buy", "purchase", "order"]) {
        quick_help("buy")
    } else if matches(&["search", "find", "look"]) {
        quick_help("search")
    } else if matches(&["cart", "basket"]) {
        quick_help("cart")
    } else if matches(&["profile", "dashboard"]) {
        quick_help("account")
    } else if matches(&["listings", "my items", "manage"]) {
        quick_help("listings")
    } else {
        DEFAULT_REPLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_route_to_topics() {
        assert_eq!(keyword_reply("How do I sign up?"), quick_help("register"));
        assert_eq!(keyword_reply("I want to SELL my bike"), quick_help("sell"));
        assert_eq!(keyword_reply("what's in my basket"), quick_help("cart"));
    }

    #[test]
    fn unknown_message_gets_greeting() {
        let reply = keyword_reply("tell me a joke");
        assert!(reply.contains("Trove assistant"));
    }

    #[test]
    fn unknown_topic_gets_overview() {
        assert!(quick_help("shipping").starts_with("I can help you with"));
        assert!(quick_help("sell").contains("Sell Item"));
    }
}
