use super::{
    ProcessingApi, RawResponse, FILES_PATH, PROCESS_FOLDER_PATH, PROCESS_UPLOAD_PATH, STATUS_PATH,
};
use crate::config::Config;
use crate::error::AppError;
use crate::models::drive_types::{
    ConnectionStatus, ProcessFolderRequest, ProcessFolderResponse, RemoteDestination, RemoteFolder,
};
use crate::models::upload_types::{LocalDestination, SelectedFile};
use async_trait::async_trait;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

/// Everything but unreserved characters gets escaped inside a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: Config,
}

impl HttpApi {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AppError::config(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

/// Pass 2xx through; otherwise read whatever body the server sent and fail.
async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .bytes()
        .await
        .ok()
        .map(|b| b.to_vec())
        .filter(|b| !b.is_empty());

    log::debug!("Request failed with {}", status);
    Err(AppError::http(status.as_u16(), body))
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn read_body(response: Response) -> Result<Vec<u8>, AppError> {
    let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
    }
    Ok(body)
}

fn build_upload_form(files: &[SelectedFile], destination: LocalDestination) -> Result<Form, AppError> {
    let mut form = Form::new();
    for file in files {
        let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(mime.as_ref())?;
        form = form.part("files", part);
    }
    Ok(form.text("destination", destination.as_wire()))
}

#[async_trait]
impl ProcessingApi for HttpApi {
    async fn connection_status(&self) -> Result<ConnectionStatus, AppError> {
        let response = self.client.get(self.url(STATUS_PATH)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn list_folders(&self) -> Result<Vec<RemoteFolder>, AppError> {
        let response = self.client.get(self.url(FILES_PATH)).send().await?;
        let response = ensure_success(response).await?;
        let folders: Option<Vec<RemoteFolder>> = response.json().await?;
        Ok(folders.unwrap_or_default())
    }

    async fn process_folder(
        &self,
        folder_id: &str,
        destination: RemoteDestination,
    ) -> Result<ProcessFolderResponse, AppError> {
        let url = format!(
            "{}/{}",
            self.url(PROCESS_FOLDER_PATH),
            utf8_percent_encode(folder_id, PATH_SEGMENT)
        );
        let response = self
            .client
            .post(url)
            .json(&ProcessFolderRequest { destination })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn process_upload(
        &self,
        files: &[SelectedFile],
        destination: LocalDestination,
    ) -> Result<RawResponse, AppError> {
        let form = build_upload_form(files, destination)?;
        let response = self
            .client
            .post(self.url(PROCESS_UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let status = response.status().as_u16();
        let content_type = header_text(response.headers(), CONTENT_TYPE);
        let content_disposition = header_text(response.headers(), CONTENT_DISPOSITION);
        let body = read_body(response).await?;

        Ok(RawResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}
