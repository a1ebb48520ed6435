use crate::errors::GenericError;
use crate::order_client::OrderProviderError;

impl From<OrderProviderError> for GenericError {
    fn from(err: OrderProviderError) -> GenericError {
        match err {
            OrderProviderError::Rejected(message) => GenericError::ValidationError(message),
            OrderProviderError::Transport(error) => GenericError::ProviderError(
                "Something went wrong while calling the order store".to_string(),
                error,
            ),
        }
    }
}
