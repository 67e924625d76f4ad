//! HTTP fetch and XML decode of one RSS document.

use serde::Deserialize;
use thiserror::Error;

/// Client identifier sent with every outbound request.
pub const USER_AGENT: &str = concat!("graze/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching a feed.
///
/// None of these abort more than the current cycle's ingestion; retry policy
/// belongs to the scheduler, which simply reselects the feed next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection, TLS, body read).
    #[error("request failed: {0}")]
    NetworkError(#[from] reqwest::Error),
    /// The server answered with a status code >= 400.
    #[error("received HTTP {0} from the feed server")]
    BadStatus(u16),
    /// The response body was not a well-formed RSS document.
    #[error("unable to decode the feed XML: {0}")]
    DecodeError(#[from] quick_xml::DeError),
}

/// In-memory parse result of one fetch. Consumed item-by-item by the
/// ingestion step and discarded; never persisted as-is.
#[derive(Debug, Clone)]
pub struct RawFeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RawFeedItem>,
}

/// One `<item>` from the document. `pub_date` is kept as the raw string so
/// the date normalizer can apply its own format priority.
#[derive(Debug, Clone)]
pub struct RawFeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
struct RssXml {
    channel: ChannelXml,
}

#[derive(Debug, Deserialize)]
struct ChannelXml {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "item")]
    items: Vec<ItemXml>,
}

#[derive(Debug, Deserialize)]
struct ItemXml {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
}

/// Fetch `url` with a single GET and decode the body as an RSS document.
///
/// The body is fully consumed before return. Cancellation is cooperative:
/// dropping the returned future aborts the in-flight request.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<RawFeedDocument, FetchError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(FetchError::BadStatus(status.as_u16()));
    }

    let body = response.text().await?;

    decode_document(&body)
}

/// Decode an RSS document and unescape HTML entities in every
/// human-readable text field, channel- and item-level alike.
pub fn decode_document(body: &str) -> Result<RawFeedDocument, FetchError> {
    let parsed: RssXml = quick_xml::de::from_str(body)?;

    let items = parsed
        .channel
        .items
        .into_iter()
        .map(|item| RawFeedItem {
            title: unescape(&item.title),
            link: item.link,
            description: unescape(&item.description),
            pub_date: item.pub_date,
        })
        .collect();

    Ok(RawFeedDocument {
        title: unescape(&parsed.channel.title),
        link: parsed.channel.link,
        description: unescape(&parsed.channel.description),
        items,
    })
}

fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Boot &amp; Reboot</title>
    <link>https://example.com</link>
    <description>Notes on &lt;systems&gt;</description>
    <item>
        <title>First &amp; Foremost</title>
        <link>https://example.com/1</link>
        <description>intro</description>
        <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
    </item>
    <item>
        <title>Second</title>
        <link>https://example.com/2</link>
        <description>followup</description>
        <pubDate>Tue, 03 Jan 2006 15:04:05 GMT</pubDate>
    </item>
</channel></rss>"#;

    #[test]
    fn decodes_channel_and_items_in_document_order() {
        let doc = decode_document(VALID_RSS).unwrap();
        assert_eq!(doc.title, "Boot & Reboot");
        assert_eq!(doc.description, "Notes on <systems>");
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].link, "https://example.com/1");
        assert_eq!(doc.items[1].link, "https://example.com/2");
    }

    #[test]
    fn unescapes_item_text_fields() {
        let doc = decode_document(VALID_RSS).unwrap();
        assert_eq!(doc.items[0].title, "First & Foremost");
    }

    #[test]
    fn keeps_pub_date_raw() {
        let doc = decode_document(VALID_RSS).unwrap();
        assert_eq!(doc.items[0].pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");
    }

    #[test]
    fn missing_optional_elements_default_to_empty() {
        let doc = decode_document(
            r#"<rss><channel><title>t</title><item><link>l</link></item></channel></rss>"#,
        )
        .unwrap();
        assert_eq!(doc.items[0].title, "");
        assert_eq!(doc.items[0].pub_date, "");
    }

    #[test]
    fn malformed_xml_is_a_decode_error() {
        let err = decode_document("<not valid xml").unwrap_err();
        assert!(matches!(err, FetchError::DecodeError(_)));
    }

    #[tokio::test]
    async fn fetch_sends_client_identifier() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let doc = fetch_feed(&client, &format!("{}/feed", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(doc.items.len(), 2);
    }

    #[tokio::test]
    async fn fetch_404_is_bad_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_feed(&client, &format!("{}/feed", mock_server.uri()))
            .await
            .unwrap_err();
        match err {
            FetchError::BadStatus(404) => {}
            e => panic!("expected BadStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn fetch_500_is_bad_status_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // no retry inside the fetcher
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_feed(&client, &format!("{}/feed", mock_server.uri()))
            .await
            .unwrap_err();
        match err {
            FetchError::BadStatus(500) => {}
            e => panic!("expected BadStatus(500), got {:?}", e),
        }
    }
}
