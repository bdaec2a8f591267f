// Message and client definitions for `armonik.api.grpc.v1`, laid out the way
// tonic-build emits them.

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskOptions {
    #[prost(map = "string, string", tag = "1")]
    pub options: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(message, optional, tag = "2")]
    pub max_duration: ::core::option::Option<::prost_types::Duration>,
    #[prost(int32, tag = "3")]
    pub max_retries: i32,
    #[prost(int32, tag = "4")]
    pub priority: i32,
    #[prost(string, tag = "5")]
    pub partition_id: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub application_name: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub application_version: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub application_namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub application_service: ::prost::alloc::string::String,
    #[prost(string, tag = "10")]
    pub engine_type: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResultStatus {
    Unspecified = 0,
    Created = 1,
    Completed = 2,
    Aborted = 3,
    Deleted = 4,
    Notfound = 127,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SessionStatus {
    Unspecified = 0,
    Running = 1,
    Cancelled = 2,
    Paused = 3,
    Closed = 4,
    Purged = 5,
    Deleted = 6,
}

// ---------------------------------------------------------------------------
// sessions
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionRaw {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(enumeration = "SessionStatus", tag = "2")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateSessionRequest {
    #[prost(message, optional, tag = "1")]
    pub default_task_option: ::core::option::Option<TaskOptions>,
    #[prost(string, repeated, tag = "2")]
    pub partition_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateSessionReply {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionIdRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionResponse {
    #[prost(message, optional, tag = "1")]
    pub session: ::core::option::Option<SessionRaw>,
}

// ---------------------------------------------------------------------------
// results
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultRaw {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub owner_task_id: ::prost::alloc::string::String,
    #[prost(enumeration = "ResultStatus", tag = "4")]
    pub status: i32,
    #[prost(string, tag = "7")]
    pub result_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResultsMetaDataRequest {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<create_results_meta_data_request::ResultCreate>,
    #[prost(string, tag = "2")]
    pub session_id: ::prost::alloc::string::String,
}

pub mod create_results_meta_data_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResultCreate {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResultsResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<ResultRaw>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateResultsRequest {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<create_results_request::ResultCreate>,
    #[prost(string, tag = "2")]
    pub session_id: ::prost::alloc::string::String,
}

pub mod create_results_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResultCreate {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "2")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultRequest {
    #[prost(string, tag = "1")]
    pub result_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultRaw>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadResultDataRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub result_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadResultDataResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub data_chunk: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteResultsDataRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub result_id: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteResultsDataResponse {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub result_id: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultsServiceConfigurationResponse {
    #[prost(int32, tag = "1")]
    pub data_chunk_max_size: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadResultDataRequest {
    #[prost(oneof = "upload_result_data_request::Type", tags = "1, 2")]
    pub r#type: ::core::option::Option<upload_result_data_request::Type>,
}

pub mod upload_result_data_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResultIdentifier {
        #[prost(string, tag = "1")]
        pub session_id: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub result_id: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "1")]
        Id(ResultIdentifier),
        #[prost(bytes, tag = "2")]
        DataChunk(::prost::alloc::vec::Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadResultDataResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultRaw>,
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitTasksRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub task_options: ::core::option::Option<TaskOptions>,
    #[prost(message, repeated, tag = "3")]
    pub task_creations: ::prost::alloc::vec::Vec<submit_tasks_request::TaskCreation>,
}

pub mod submit_tasks_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TaskCreation {
        #[prost(string, repeated, tag = "1")]
        pub expected_output_keys: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "2")]
        pub data_dependencies: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, tag = "3")]
        pub payload_id: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "4")]
        pub task_options: ::core::option::Option<super::TaskOptions>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitTasksResponse {
    #[prost(message, repeated, tag = "1")]
    pub task_infos: ::prost::alloc::vec::Vec<submit_tasks_response::TaskInfo>,
}

pub mod submit_tasks_response {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TaskInfo {
        #[prost(string, tag = "1")]
        pub task_id: ::prost::alloc::string::String,
        #[prost(string, repeated, tag = "2")]
        pub expected_output_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "3")]
        pub data_dependencies: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, tag = "4")]
        pub payload_id: ::prost::alloc::string::String,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultIdsRequest {
    #[prost(string, repeated, tag = "1")]
    pub task_id: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultIdsResponse {
    #[prost(message, repeated, tag = "1")]
    pub task_results: ::prost::alloc::vec::Vec<get_result_ids_response::MapTaskResult>,
}

pub mod get_result_ids_response {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MapTaskResult {
        #[prost(string, tag = "1")]
        pub task_id: ::prost::alloc::string::String,
        #[prost(string, repeated, tag = "2")]
        pub result_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }
}

// ---------------------------------------------------------------------------
// submitter
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultStatusRequest {
    #[prost(string, repeated, tag = "1")]
    pub result_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "2")]
    pub session_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResultStatusReply {
    #[prost(message, repeated, tag = "1")]
    pub id_statuses: ::prost::alloc::vec::Vec<get_result_status_reply::IdStatus>,
}

pub mod get_result_status_reply {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct IdStatus {
        #[prost(string, tag = "1")]
        pub result_id: ::prost::alloc::string::String,
        #[prost(enumeration = "super::ResultStatus", tag = "2")]
        pub status: i32,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskOutputRequest {
    #[prost(string, tag = "1")]
    pub session: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub task_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Output {
    #[prost(oneof = "output::Type", tags = "2, 3")]
    pub r#type: ::core::option::Option<output::Type>,
}

pub mod output {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Error {
        #[prost(string, tag = "1")]
        pub details: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "2")]
        Ok(super::Empty),
        #[prost(message, tag = "3")]
        Error(Error),
    }
}

// ---------------------------------------------------------------------------
// clients
// ---------------------------------------------------------------------------

/// Emits one unary client method in the shape tonic-build generates.
macro_rules! unary_method {
    ($name:ident, $service:literal, $method:literal, $req:ty, $resp:ty) => {
        pub async fn $name(
            &mut self,
            request: impl tonic::IntoRequest<$req>,
        ) -> std::result::Result<tonic::Response<$resp>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(concat!("/", $service, "/", $method));
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new($service, $method));
            self.inner.unary(req, path, codec).await
        }
    };
}

/// Emits the client struct and its constructors.
macro_rules! grpc_client {
    ($client:ident { $($methods:tt)* }) => {
        #[derive(Debug, Clone)]
        pub struct $client<T> {
            inner: tonic::client::Grpc<T>,
        }

        impl<T> $client<T>
        where
            T: tonic::client::GrpcService<tonic::body::BoxBody>,
            T::Error: Into<StdError>,
            T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
            <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
        {
            pub fn new(inner: T) -> Self {
                let inner = tonic::client::Grpc::new(inner);
                Self { inner }
            }

            $($methods)*
        }
    };
}

pub mod sessions_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    grpc_client!(SessionsClient {
        unary_method!(create_session, "armonik.api.grpc.v1.sessions.Sessions", "CreateSession",
            super::CreateSessionRequest, super::CreateSessionReply);
        unary_method!(cancel_session, "armonik.api.grpc.v1.sessions.Sessions", "CancelSession",
            super::SessionIdRequest, super::SessionResponse);
        unary_method!(close_session, "armonik.api.grpc.v1.sessions.Sessions", "CloseSession",
            super::SessionIdRequest, super::SessionResponse);
        unary_method!(purge_session, "armonik.api.grpc.v1.sessions.Sessions", "PurgeSession",
            super::SessionIdRequest, super::SessionResponse);
    });
}

pub mod results_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    grpc_client!(ResultsClient {
        unary_method!(create_results_meta_data, "armonik.api.grpc.v1.results.Results",
            "CreateResultsMetaData", super::CreateResultsMetaDataRequest, super::CreateResultsResponse);
        unary_method!(create_results, "armonik.api.grpc.v1.results.Results", "CreateResults",
            super::CreateResultsRequest, super::CreateResultsResponse);
        unary_method!(get_result, "armonik.api.grpc.v1.results.Results", "GetResult",
            super::GetResultRequest, super::GetResultResponse);
        unary_method!(delete_results_data, "armonik.api.grpc.v1.results.Results",
            "DeleteResultsData", super::DeleteResultsDataRequest, super::DeleteResultsDataResponse);
        unary_method!(get_service_configuration, "armonik.api.grpc.v1.results.Results",
            "GetServiceConfiguration", super::Empty, super::ResultsServiceConfigurationResponse);

        pub async fn upload_result_data(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::UploadResultDataRequest>,
        ) -> std::result::Result<tonic::Response<super::UploadResultDataResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/armonik.api.grpc.v1.results.Results/UploadResultData",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "armonik.api.grpc.v1.results.Results",
                "UploadResultData",
            ));
            self.inner.client_streaming(req, path, codec).await
        }

        pub async fn download_result_data(
            &mut self,
            request: impl tonic::IntoRequest<super::DownloadResultDataRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::DownloadResultDataResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/armonik.api.grpc.v1.results.Results/DownloadResultData",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "armonik.api.grpc.v1.results.Results",
                "DownloadResultData",
            ));
            self.inner.server_streaming(req, path, codec).await
        }
    });
}

pub mod tasks_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    grpc_client!(TasksClient {
        unary_method!(submit_tasks, "armonik.api.grpc.v1.tasks.Tasks", "SubmitTasks",
            super::SubmitTasksRequest, super::SubmitTasksResponse);
        unary_method!(get_result_ids, "armonik.api.grpc.v1.tasks.Tasks", "GetResultIds",
            super::GetResultIdsRequest, super::GetResultIdsResponse);
    });
}

pub mod submitter_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;

    grpc_client!(SubmitterClient {
        unary_method!(get_result_status, "armonik.api.grpc.v1.submitter.Submitter",
            "GetResultStatus", super::GetResultStatusRequest, super::GetResultStatusReply);
        unary_method!(try_get_task_output, "armonik.api.grpc.v1.submitter.Submitter",
            "TryGetTaskOutput", super::TaskOutputRequest, super::Output);
    });
}
