//! Bridge between the cloud client and the sync job's `Transport` trait.

use matsync_cloud::{Client, Error};
use matsync_sync_job::{BoxFuture, Transport, TransportFailure, TransportResponse};

/// Runs sync job requests over [`matsync_cloud::Client`].
///
/// Non-2xx replies are passed through as responses; the job decides
/// whether a status is fatal.
pub struct CloudTransport {
    client: Client,
}

impl CloudTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn into_transport(result: Result<matsync_cloud::Response, Error>) -> Result<TransportResponse, TransportFailure> {
    match result {
        Ok(resp) => Ok(TransportResponse::new(resp.status, resp.body)),
        Err(Error::Api { status, body }) => Ok(TransportResponse::new(status, body)),
        Err(e) => Err(TransportFailure(e.to_string())),
    }
}

impl Transport for CloudTransport {
    fn put(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        let url = url.to_string();
        let content_type = content_type.to_string();
        Box::pin(async move { into_transport(self.client.put(&url, &content_type, body).await) })
    }

    fn get(&self, url: &str) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        let url = url.to_string();
        Box::pin(async move { into_transport(self.client.get(&url).await) })
    }
}
