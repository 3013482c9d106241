use thiserror::Error;

/// Domain-validation failures plus the storage error passthrough. Every
/// domain variant is recoverable by the user fixing the request; none is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error("you already own this product")]
    AlreadyOwned,

    #[error("this product is already sold")]
    AlreadySold,

    #[error("this product is already in your list")]
    Duplicate,

    #[error("you cannot make an offer on your own product")]
    SelfOffer,

    #[error("you can only act on your own resources")]
    NotOwner,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("you can only review products you have purchased")]
    NoPurchaseProof,

    #[error("you have already reviewed this product")]
    DuplicateReview,

    #[error("this offer has already been resolved")]
    OfferClosed,

    #[error("rating must be between 1 and 5")]
    InvalidRating,

    #[error("username already taken")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// True for errors the user can fix and resubmit, as opposed to
    /// infrastructure failures.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Error::LockPoisoned | Error::Sqlite(_))
    }
}
