pub(crate) mod common;
pub use common::{Authorization, JsonRpcError};

mod http;
pub use self::http::{ClientError as HttpClientError, HttpBuildError, Provider as Http};

mod quorum;
pub use quorum::{
    BatchClientWrapper, EndpointFailure, HeightProbe, LabeledClient, QuorumClient,
    QuorumClientBuilder, QuorumError,
};

mod mock;
pub use mock::{MockClient, MockError, MockResponse};
