//! Results client wrapper

use crate::error::{CoreError, CoreResult};
use crate::generated::armonik_v1;
use crate::generated::armonik_v1::results_client::ResultsClient as GrpcResultsClient;
use std::collections::HashMap;
use tonic::transport::Channel;
use tracing::debug;

/// Lifecycle status of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Unspecified,
    /// Created, waiting for its owner task to produce it
    Created,
    /// Data is available
    Completed,
    /// Owner task failed
    Aborted,
    /// Data was deleted
    Deleted,
    /// Unknown to the control plane
    NotFound,
}

impl ResultStatus {
    /// Whether the result will not change status anymore
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResultStatus::Completed
                | ResultStatus::Aborted
                | ResultStatus::Deleted
                | ResultStatus::NotFound
        )
    }
}

impl From<i32> for ResultStatus {
    fn from(raw: i32) -> Self {
        match armonik_v1::ResultStatus::try_from(raw) {
            Ok(armonik_v1::ResultStatus::Created) => ResultStatus::Created,
            Ok(armonik_v1::ResultStatus::Completed) => ResultStatus::Completed,
            Ok(armonik_v1::ResultStatus::Aborted) => ResultStatus::Aborted,
            Ok(armonik_v1::ResultStatus::Deleted) => ResultStatus::Deleted,
            Ok(armonik_v1::ResultStatus::Notfound) => ResultStatus::NotFound,
            Ok(armonik_v1::ResultStatus::Unspecified) | Err(_) => ResultStatus::Unspecified,
        }
    }
}

/// Metadata of a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInfo {
    pub result_id: String,
    pub name: String,
    pub owner_task_id: String,
    pub status: ResultStatus,
}

impl From<armonik_v1::ResultRaw> for ResultInfo {
    fn from(raw: armonik_v1::ResultRaw) -> Self {
        Self {
            status: ResultStatus::from(raw.status),
            result_id: raw.result_id,
            name: raw.name,
            owner_task_id: raw.owner_task_id,
        }
    }
}

/// Client for result metadata and data operations
#[derive(Debug, Clone)]
pub struct ResultsClient {
    inner: GrpcResultsClient<Channel>,
}

impl ResultsClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: GrpcResultsClient::new(channel),
        }
    }

    /// Create empty results, to be produced by tasks.
    ///
    /// Returns the result ids in the order of `names`.
    pub async fn create_results_metadata(
        &mut self,
        session_id: &str,
        names: &[String],
    ) -> CoreResult<Vec<String>> {
        let request = armonik_v1::CreateResultsMetaDataRequest {
            session_id: session_id.to_string(),
            results: names
                .iter()
                .map(|name| armonik_v1::create_results_meta_data_request::ResultCreate {
                    name: name.clone(),
                })
                .collect(),
        };

        let response = self.inner.create_results_meta_data(request).await?;
        ids_by_name(names, response.into_inner().results)
    }

    /// Create results that already hold data, e.g. task payloads.
    ///
    /// Returns the result ids in the order of `results`.
    pub async fn create_results(
        &mut self,
        session_id: &str,
        results: Vec<(String, Vec<u8>)>,
    ) -> CoreResult<Vec<String>> {
        let names: Vec<String> = results.iter().map(|(name, _)| name.clone()).collect();
        let request = armonik_v1::CreateResultsRequest {
            session_id: session_id.to_string(),
            results: results
                .into_iter()
                .map(|(name, data)| armonik_v1::create_results_request::ResultCreate { name, data })
                .collect(),
        };

        let response = self.inner.create_results(request).await?;
        ids_by_name(&names, response.into_inner().results)
    }

    /// Fetch the metadata of a single result
    pub async fn get_result(&mut self, result_id: &str) -> CoreResult<ResultInfo> {
        let request = armonik_v1::GetResultRequest {
            result_id: result_id.to_string(),
        };

        let response = self.inner.get_result(request).await?;
        response
            .into_inner()
            .result
            .map(ResultInfo::from)
            .ok_or_else(|| {
                CoreError::UnexpectedResponse(format!("no metadata returned for result {result_id}"))
            })
    }

    /// Download the whole data of a completed result
    pub async fn download_result_data(
        &mut self,
        session_id: &str,
        result_id: &str,
    ) -> CoreResult<Vec<u8>> {
        let request = armonik_v1::DownloadResultDataRequest {
            session_id: session_id.to_string(),
            result_id: result_id.to_string(),
        };

        let mut stream = self.inner.download_result_data(request).await?.into_inner();
        let mut data = Vec::new();
        while let Some(chunk) = stream.message().await? {
            data.extend_from_slice(&chunk.data_chunk);
        }
        Ok(data)
    }

    /// Largest data chunk the control plane accepts in one message
    pub async fn data_chunk_max_size(&mut self) -> CoreResult<usize> {
        let response = self
            .inner
            .get_service_configuration(armonik_v1::Empty {})
            .await?;
        let size = response.into_inner().data_chunk_max_size;
        usize::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                CoreError::UnexpectedResponse(format!("invalid data chunk size {size}"))
            })
    }

    /// Stream `data` into an existing result, at most `chunk_size` bytes per
    /// message.
    pub async fn upload_result_data(
        &mut self,
        session_id: &str,
        result_id: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> CoreResult<()> {
        let messages = upload_messages(session_id, result_id, data, chunk_size);
        debug!(result_id, size = data.len(), messages = messages.len(), "Uploading result data");
        self.inner
            .upload_result_data(tokio_stream::iter(messages))
            .await?;
        Ok(())
    }

    /// Delete the data of the given results, keeping their metadata
    pub async fn delete_results_data(
        &mut self,
        session_id: &str,
        result_ids: &[String],
    ) -> CoreResult<()> {
        let request = armonik_v1::DeleteResultsDataRequest {
            session_id: session_id.to_string(),
            result_id: result_ids.to_vec(),
        };

        self.inner.delete_results_data(request).await?;
        Ok(())
    }
}

/// Identifier message followed by the data cut in chunks.
fn upload_messages(
    session_id: &str,
    result_id: &str,
    data: &[u8],
    chunk_size: usize,
) -> Vec<armonik_v1::UploadResultDataRequest> {
    use armonik_v1::upload_result_data_request::{ResultIdentifier, Type};

    let header = armonik_v1::UploadResultDataRequest {
        r#type: Some(Type::Id(ResultIdentifier {
            session_id: session_id.to_string(),
            result_id: result_id.to_string(),
        })),
    };
    std::iter::once(header)
        .chain(data.chunks(chunk_size.max(1)).map(|chunk| {
            armonik_v1::UploadResultDataRequest {
                r#type: Some(Type::DataChunk(chunk.to_vec())),
            }
        }))
        .collect()
}

/// Order the ids of created results like the requested names.
fn ids_by_name(names: &[String], created: Vec<armonik_v1::ResultRaw>) -> CoreResult<Vec<String>> {
    if created.len() != names.len() {
        return Err(CoreError::UnexpectedResponse(format!(
            "asked for {} results, control plane created {}",
            names.len(),
            created.len()
        )));
    }
    let mut by_name: HashMap<String, String> = created
        .into_iter()
        .map(|raw| (raw.name, raw.result_id))
        .collect();
    names
        .iter()
        .map(|name| {
            by_name.remove(name).ok_or_else(|| {
                CoreError::UnexpectedResponse(format!("result {name} missing from response"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, id: &str, status: armonik_v1::ResultStatus) -> armonik_v1::ResultRaw {
        armonik_v1::ResultRaw {
            session_id: "session".to_string(),
            name: name.to_string(),
            owner_task_id: String::new(),
            status: status as i32,
            result_id: id.to_string(),
        }
    }

    #[test]
    fn test_status_from_raw() {
        assert_eq!(ResultStatus::from(2), ResultStatus::Completed);
        assert_eq!(ResultStatus::from(3), ResultStatus::Aborted);
        assert_eq!(ResultStatus::from(127), ResultStatus::NotFound);
        assert_eq!(ResultStatus::from(1), ResultStatus::Created);
        assert_eq!(ResultStatus::from(42), ResultStatus::Unspecified);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ResultStatus::Completed.is_terminal());
        assert!(ResultStatus::NotFound.is_terminal());
        assert!(!ResultStatus::Created.is_terminal());
        assert!(!ResultStatus::Unspecified.is_terminal());
    }

    #[test]
    fn test_ids_follow_requested_order() {
        let names = vec!["a".to_string(), "b".to_string()];
        let created = vec![
            raw("b", "id-b", armonik_v1::ResultStatus::Created),
            raw("a", "id-a", armonik_v1::ResultStatus::Created),
        ];
        assert_eq!(ids_by_name(&names, created).unwrap(), vec!["id-a", "id-b"]);
    }

    #[test]
    fn test_missing_result_is_an_error() {
        let names = vec!["a".to_string(), "b".to_string()];
        let created = vec![raw("a", "id-a", armonik_v1::ResultStatus::Created)];
        assert!(ids_by_name(&names, created).is_err());

        let created = vec![
            raw("a", "id-a", armonik_v1::ResultStatus::Created),
            raw("c", "id-c", armonik_v1::ResultStatus::Created),
        ];
        assert!(ids_by_name(&names, created).is_err());
    }

    #[test]
    fn test_result_info_from_raw() {
        let info = ResultInfo::from(raw("out", "r1", armonik_v1::ResultStatus::Aborted));
        assert_eq!(info.result_id, "r1");
        assert_eq!(info.status, ResultStatus::Aborted);
    }

    #[test]
    fn test_upload_is_identifier_then_chunks() {
        use armonik_v1::upload_result_data_request::Type;

        let data: Vec<u8> = (0..10).collect();
        let messages = upload_messages("s1", "r1", &data, 4);
        assert_eq!(messages.len(), 4);
        match &messages[0].r#type {
            Some(Type::Id(id)) => {
                assert_eq!(id.session_id, "s1");
                assert_eq!(id.result_id, "r1");
            }
            other => panic!("expected identifier first, got {other:?}"),
        }
        let chunks: Vec<Vec<u8>> = messages[1..]
            .iter()
            .map(|message| match &message.r#type {
                Some(Type::DataChunk(chunk)) => chunk.clone(),
                other => panic!("expected a data chunk, got {other:?}"),
            })
            .collect();
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_upload_of_empty_data_sends_only_identifier() {
        assert_eq!(upload_messages("s1", "r1", &[], 4).len(), 1);
    }
}
