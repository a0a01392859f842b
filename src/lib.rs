use std::borrow::Cow;

pub(crate) type Str<'a> = Cow<'a, str>;

pub mod client;
pub mod download;
pub mod error;
pub mod experiment;
pub mod generate;
pub mod model;
pub mod session;

pub use client::Client;

pub mod prelude {
    use super::*;

    pub use client::Client;

    pub use error::Error;
    pub use error::Result;

    pub use experiment::Outcome;
    pub use experiment::Progress;
    pub use experiment::Report;

    pub use generate::Generation;
    pub use generate::Generator;
    pub use generate::Metadata;

    pub use model::KnownModel;
    pub use model::KNOWN_MODELS;

    pub use session::Session;
}
