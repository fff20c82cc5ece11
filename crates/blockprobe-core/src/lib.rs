pub mod error;
pub mod exec;
pub mod rpc;
pub mod scenario;
pub mod types;
pub mod validate;

pub use error::{CoreError, ErrorKind, RpcError, ValidationError};
pub use rpc::{NodeRpc, RpcClient, RpcOptions};
pub use scenario::{ScenarioBuilder, ScenarioReport, ScenarioStage, ScenarioState};
