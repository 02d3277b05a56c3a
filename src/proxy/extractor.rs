//! Extraction of proxy candidates from listing markup

use crate::proxy::models::Candidate;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::net::IpAddr;

/// Attribute whose value encodes `address:port`
pub const PROXY_ATTRIBUTE: &str = "data-proxy";

/// Collects candidates from start tags as the tokenizer emits them
struct ProxyTagSink {
    source_name: String,
    candidates: Vec<Candidate>,
}

impl TokenSink for ProxyTagSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(tag) = token {
            if tag.kind == TagKind::StartTag {
                let value = tag
                    .attrs
                    .iter()
                    .find(|attr| &*attr.name.local == PROXY_ATTRIBUTE)
                    .map(|attr| &*attr.value);
                if let Some(candidate) =
                    value.and_then(|value| parse_proxy_attribute(value, &self.source_name))
                {
                    self.candidates.push(candidate);
                }
            }
        }
        TokenSinkResult::Continue
    }
}

/// Extract every well-formed candidate from a listing page.
///
/// Start and self-closing tags are read straight off the token stream, so an
/// element counts wherever it sits in the page. Elements whose attribute does
/// not hold an IP literal and a port in 1..=65535 are skipped. An empty
/// result is not an error.
pub fn extract(body: &[u8], source_name: &str) -> Vec<Candidate> {
    let markup = String::from_utf8_lossy(body);
    let sink = ProxyTagSink {
        source_name: source_name.to_string(),
        candidates: Vec::new(),
    };

    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(&markup));

    let mut tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.candidates
}

/// Parse an `address:port` attribute value, splitting on the first `:`
fn parse_proxy_attribute(value: &str, source_name: &str) -> Option<Candidate> {
    let (host, port) = value.trim().split_once(':')?;
    if host.is_empty() || port.is_empty() {
        return None;
    }

    let address: IpAddr = host.parse().ok()?;
    let port: u16 = port.parse().ok()?;
    if port == 0 {
        return None;
    }

    Some(Candidate::new(address, port, source_name.to_string()))
}
