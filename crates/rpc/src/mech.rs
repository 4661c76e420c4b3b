use crate::RpcResult;
use crate::common::{MechRequest, MechResponse};
use jsonrpsee::proc_macros::rpc;

#[rpc(server, client, namespace = "mech")]
pub trait MechApi {
    /// Off-chain delivery: answers once the mech has produced a result.
    #[method(name = "sendRequest")]
    async fn send_request(&self, request: MechRequest) -> RpcResult<MechResponse>;

    /// Result availability for requests posted on-chain, keyed by request id.
    #[method(name = "getResult")]
    async fn get_result(&self, request_id: String) -> RpcResult<Option<MechResponse>>;
}
