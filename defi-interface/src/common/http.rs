use common::ProviderError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// GET a JSON endpoint, tagging failures by provider.
pub async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    provider: &str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ProviderError> {
    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::unavailable(provider, e))?;
    read_json(provider, response).await
}

/// POST a JSON body and decode a JSON response, tagging failures by provider.
pub async fn post_json<B, T>(
    http: &reqwest::Client,
    provider: &str,
    url: &str,
    body: &B,
) -> Result<T, ProviderError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::unavailable(provider, e))?;
    read_json(provider, response).await
}

// 4xx means the provider looked at the request and said no; everything else
// is treated as transient.
async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let reason = response.text().await.unwrap_or_else(|_| status.to_string());
        return Err(if status.is_client_error() {
            ProviderError::rejected(provider, reason)
        } else {
            ProviderError::unavailable(provider, reason)
        });
    }

    response.json::<T>().await.map_err(|e| ProviderError::unavailable(provider, e))
}
