mod error;
mod extractor;
mod session;

pub use error::ClientContextError;
pub use extractor::{decode_client_context, ClientContext, ContextHydrator, CrmConnection};
pub use session::SessionContext;

pub const CLIENT_CONTEXT_HEADER: &str = "x-client-context";
