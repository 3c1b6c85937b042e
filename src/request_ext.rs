use hyper::header::AsHeaderName;
use hyper::http::request::Parts;

/// Request header carrying the Parse session token.
pub static SESSION_TOKEN_HEADER: &str = "x-parse-session-token";

pub trait HeaderExt {
    fn get_header<K: AsHeaderName>(&self, header: K) -> Option<String>;
    fn session_token(&self) -> Option<String>;
}

impl HeaderExt for Parts {
    fn get_header<K>(&self, header: K) -> Option<String>
    where
        K: AsHeaderName,
    {
        self.headers
            .get(header)
            .and_then(|header| header.to_str().ok())
            .map(ToString::to_string)
    }

    fn session_token(&self) -> Option<String> {
        self.get_header(SESSION_TOKEN_HEADER)
    }
}
