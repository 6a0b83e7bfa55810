//! Services layer: token issuance, session management, store clients and the
//! payment gateway.

pub mod database;
pub mod error;
pub mod gateway;
pub mod jwt;
pub mod session;

pub use database::MongoDb;
pub use error::ServiceError;
pub use gateway::{CheckoutSession, MockGateway, PaymentGateway, StripeGateway};
pub use jwt::{AccessTokenClaims, TokenError, TokenService};
pub use session::{
    MockSessionStore, RedisSessionStore, SessionManager, SessionSnapshot, SessionStore,
};
