use jsonrpsee::core::ClientError;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::types::error::{INTERNAL_ERROR_CODE, INTERNAL_ERROR_MSG, INVALID_PARAMS_CODE};

/// The indexer has not seen the request yet.
pub const UNKNOWN_REQUEST_CODE: i32 = -32004;

pub fn unknown_request_error(request_id: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        UNKNOWN_REQUEST_CODE,
        format!("unknown request {request_id}"),
        None::<()>,
    )
}

pub fn invalid_request_error(msg: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(INVALID_PARAMS_CODE, msg, None::<()>)
}

pub fn internal_error() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(INTERNAL_ERROR_CODE, INTERNAL_ERROR_MSG, None::<()>)
}

pub fn is_unknown_request(err: &ClientError) -> bool {
    matches!(err, ClientError::Call(obj) if obj.code() == UNKNOWN_REQUEST_CODE)
}
