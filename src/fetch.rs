use reqwest::Client;
use std::io::{self, Write};
use thiserror::Error;

const MAX_SIZE: u64 = 100 * 1024 * 1024; // Maximum response size in bytes (100 MB)

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Response Body Exceeded the maximum of {MAX_SIZE} bytes")]
    TooLarge,
    #[error("Error Sending Request")]
    Send,
    #[error("Error Reading Response")]
    Chunk,
}

pub async fn fetch_data(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|_| FetchError::Send)?;

    let mut content_length = 0;
    let mut body = Vec::new();
    let mut writer = io::Cursor::new(&mut body);
    // stream the response so we can check how large the requested data is
    // without having to download the entire thing
    while let Some(chunk) = response.chunk().await.map_err(|_| FetchError::Chunk)? {
        content_length += chunk.len() as u64;
        if content_length > MAX_SIZE {
            return Err(FetchError::TooLarge);
        }
        writer.write_all(&chunk).map_err(|_| FetchError::Chunk)?;
    }

    Ok(body)
}
