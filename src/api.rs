// API client module: a small blocking HTTP client for the pinning service.
// Everything here is synchronous; the upload body is streamed from disk as
// the transport pulls it.

use crate::config::Config;
use crate::credentials::{CredentialStore, TokenFile};
use crate::enumerate::enumerate;
use crate::error::{PinataError, Result};
use crate::multipart;
use crate::progress::ProgressReader;
use crate::types::{Credential, ListQuery, Metadata, PinList, UploadOptions, UploadResult};
use crate::ui::Reporter;
use reqwest::blocking::{Body, Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

const PIN_FILE_PATH: &str = "pinning/pinFileToIPFS";
const TEST_AUTH_PATH: &str = "data/testAuthentication";
const PIN_LIST_PATH: &str = "data/pinList";
const UNPIN_PATH: &str = "pinning/unpin";

/// Client for the pinning service. Holds the reqwest blocking client, the
/// endpoint configuration and the store the bearer token is read from.
pub struct PinataClient<S = TokenFile> {
    client: Client,
    config: Config,
    store: S,
}

impl PinataClient<TokenFile> {
    /// Client configured from `PINATA_HOST` with the token file in the
    /// user's home directory.
    pub fn from_env() -> Result<Self> {
        PinataClient::new(Config::from_env(), TokenFile::in_home())
    }
}

impl<S: CredentialStore> PinataClient<S> {
    pub fn new(config: Config, store: S) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(PinataClient {
            client,
            config,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload a file or directory tree and pin it.
    ///
    /// The credential is resolved before the filesystem is touched. Any
    /// failure is terminal; nothing is retried and no partial result is
    /// returned.
    pub fn upload(&self, path: &Path, reporter: &dyn Reporter) -> Result<UploadResult> {
        let credential = self.store.load()?;
        debug!("credential resolved");

        let (target, files) = enumerate(path)?;
        debug!(root = %target.path.display(), files = files.len(), "target enumerated");

        let name = target.base_name();
        let body = multipart::encode(
            &target,
            &files,
            &Metadata::named(name.clone()),
            &UploadOptions::default(),
        )?;
        let total = body.content_length;
        debug!(total, "body encoded");

        let bar = reporter.start_upload(&name, total);
        let reader = ProgressReader::new(body.reader, total, bar.clone())
            .on_complete(reporter.upload_sent(&bar));

        let url = self.config.endpoint(PIN_FILE_PATH);
        info!(%url, bytes = total, "sending upload");
        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, credential.bearer())
            .header(CONTENT_TYPE, body.content_type)
            .body(Body::sized(reader, total))
            .send();
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                bar.abandon();
                debug!(error = %e, "transport failed");
                return Err(e.into());
            }
        };
        debug!(status = res.status().as_u16(), "request sent");

        if res.status() != StatusCode::OK {
            bar.abandon();
            return Err(PinataError::RemoteRejected {
                status: res.status().as_u16(),
            });
        }
        if !bar.is_finished() {
            bar.finish();
        }

        let result: UploadResult = decode(res)?;
        info!(cid = %result.ipfs_hash, duplicate = result.is_duplicate, "upload pinned");
        reporter.finish_upload(&result);
        Ok(result)
    }

    /// Check the service with `credential` and return the HTTP status.
    pub fn test_authentication(&self, credential: &Credential) -> Result<u16> {
        let url = self.config.endpoint(TEST_AUTH_PATH);
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.bearer())
            .send()?;
        let status = res.status().as_u16();
        debug!(status, "authentication checked");
        Ok(status)
    }

    /// Fetch the most recent pins matching `query`.
    pub fn list(&self, query: &ListQuery) -> Result<PinList> {
        let credential = self.store.load()?;
        let url = self.config.endpoint(PIN_LIST_PATH);
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.bearer())
            .query(&query.to_pairs())
            .send()?;
        expect_ok(&res)?;
        decode(res)
    }

    /// Unpin content by CID.
    pub fn delete(&self, cid: &str) -> Result<()> {
        let cid = cid.trim();
        if cid.is_empty() || cid.contains('/') {
            return Err(PinataError::InvalidArgument(format!("bad CID {:?}", cid)));
        }
        let credential = self.store.load()?;
        let url = self.config.endpoint(&format!("{}/{}", UNPIN_PATH, cid));
        let res = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, credential.bearer())
            .send()?;
        expect_ok(&res)?;
        info!(cid, "unpinned");
        Ok(())
    }
}

fn expect_ok(res: &Response) -> Result<()> {
    if res.status() != StatusCode::OK {
        return Err(PinataError::RemoteRejected {
            status: res.status().as_u16(),
        });
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let bytes = res.bytes()?;
    serde_json::from_slice(&bytes).map_err(PinataError::Decoding)
}
