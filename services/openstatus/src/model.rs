//! Monitor specification types
//!
//! These are the declared shapes users write in `openstatus.yaml` and the
//! lock file. Field names and enum spellings are part of the document format.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How often a monitor runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "30s")]
    ThirtySeconds,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::ThirtySeconds,
        Frequency::OneMinute,
        Frequency::FiveMinutes,
        Frequency::TenMinutes,
        Frequency::ThirtyMinutes,
        Frequency::OneHour,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Frequency::ThirtySeconds => "30s",
            Frequency::OneMinute => "1m",
            Frequency::FiveMinutes => "5m",
            Frequency::TenMinutes => "10m",
            Frequency::ThirtyMinutes => "30m",
            Frequency::OneHour => "1h",
        }
    }
}

/// Monitor kind, discriminates the request shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    Http,
    Tcp,
}

impl MonitorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MonitorKind::Http => "http",
            MonitorKind::Tcp => "tcp",
        }
    }
}

/// Probe locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Ams,
    Arn,
    Atl,
    Bom,
    Bog,
    Bos,
    Cdg,
    Den,
    Dfw,
    Ewr,
    Eze,
    Fra,
    Gdl,
    Gig,
    Gru,
    Hkg,
    Iad,
    Jnb,
    Lax,
    Lhr,
    Mad,
    Mia,
    Nrt,
    Ord,
    Otp,
    Phx,
    Private,
    Qro,
    Scl,
    Sea,
    Sin,
    Sjc,
    Syd,
    Waw,
    Yul,
    Yyz,
}

impl Region {
    pub const ALL: [Region; 36] = [
        Region::Ams,
        Region::Arn,
        Region::Atl,
        Region::Bom,
        Region::Bog,
        Region::Bos,
        Region::Cdg,
        Region::Den,
        Region::Dfw,
        Region::Ewr,
        Region::Eze,
        Region::Fra,
        Region::Gdl,
        Region::Gig,
        Region::Gru,
        Region::Hkg,
        Region::Iad,
        Region::Jnb,
        Region::Lax,
        Region::Lhr,
        Region::Mad,
        Region::Mia,
        Region::Nrt,
        Region::Ord,
        Region::Otp,
        Region::Phx,
        Region::Private,
        Region::Qro,
        Region::Scl,
        Region::Sea,
        Region::Sin,
        Region::Sjc,
        Region::Syd,
        Region::Waw,
        Region::Yul,
        Region::Yyz,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Region::Ams => "ams",
            Region::Arn => "arn",
            Region::Atl => "atl",
            Region::Bom => "bom",
            Region::Bog => "bog",
            Region::Bos => "bos",
            Region::Cdg => "cdg",
            Region::Den => "den",
            Region::Dfw => "dfw",
            Region::Ewr => "ewr",
            Region::Eze => "eze",
            Region::Fra => "fra",
            Region::Gdl => "gdl",
            Region::Gig => "gig",
            Region::Gru => "gru",
            Region::Hkg => "hkg",
            Region::Iad => "iad",
            Region::Jnb => "jnb",
            Region::Lax => "lax",
            Region::Lhr => "lhr",
            Region::Mad => "mad",
            Region::Mia => "mia",
            Region::Nrt => "nrt",
            Region::Ord => "ord",
            Region::Otp => "otp",
            Region::Phx => "phx",
            Region::Private => "private",
            Region::Qro => "qro",
            Region::Scl => "scl",
            Region::Sea => "sea",
            Region::Sin => "sin",
            Region::Sjc => "sjc",
            Region::Syd => "syd",
            Region::Waw => "waw",
            Region::Yul => "yul",
            Region::Yyz => "yyz",
        }
    }
}

/// HTTP method used by an HTTP monitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Options,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

/// What part of the response an assertion inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionKind {
    StatusCode,
    Header,
    TextBody,
}

impl AssertionKind {
    pub const ALL: [AssertionKind; 3] = [
        AssertionKind::StatusCode,
        AssertionKind::Header,
        AssertionKind::TextBody,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AssertionKind::StatusCode => "statusCode",
            AssertionKind::Header => "header",
            AssertionKind::TextBody => "textBody",
        }
    }
}

/// Comparison operator of an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compare {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    Empty,
    NotEmpty,
}

impl Compare {
    pub const ALL: [Compare; 10] = [
        Compare::Eq,
        Compare::NotEq,
        Compare::Gt,
        Compare::Gte,
        Compare::Lt,
        Compare::Lte,
        Compare::Contains,
        Compare::NotContains,
        Compare::Empty,
        Compare::NotEmpty,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Compare::Eq => "eq",
            Compare::NotEq => "not_eq",
            Compare::Gt => "gt",
            Compare::Gte => "gte",
            Compare::Lt => "lt",
            Compare::Lte => "lte",
            Compare::Contains => "contains",
            Compare::NotContains => "not_contains",
            Compare::Empty => "empty",
            Compare::NotEmpty => "not_empty",
        }
    }
}

macro_rules! impl_str_enum {
    ($($ty:ident => $what:literal),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    Self::ALL
                        .iter()
                        .copied()
                        .find(|candidate| candidate.as_str() == raw)
                        .ok_or_else(|| format!("unknown {}: {}", $what, raw))
                }
            }
        )*
    };
}

impl_str_enum!(
    Frequency => "frequency",
    Region => "region",
    Method => "method",
    AssertionKind => "assertion kind",
    Compare => "comparator",
);

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "http" => Ok(MonitorKind::Http),
            "tcp" => Ok(MonitorKind::Tcp),
            other => Err(format!("unknown monitor kind: {}", other)),
        }
    }
}

/// Expected value of an assertion
///
/// Numbers coming out of YAML or JSON may be decoded as floats (`200.0`);
/// they are truncated to integers here so that equality against a literal
/// `200` holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssertionTarget {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for AssertionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionTarget::Numeric(value) => write!(f, "{}", value),
            AssertionTarget::Text(value) => f.write_str(value),
        }
    }
}

impl Serialize for AssertionTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AssertionTarget::Numeric(value) => serializer.serialize_i64(*value),
            AssertionTarget::Text(value) => serializer.serialize_str(value),
        }
    }
}

struct TargetVisitor;

impl<'de> Visitor<'de> for TargetVisitor {
    type Value = AssertionTarget;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(AssertionTarget::Numeric(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(AssertionTarget::Numeric)
            .map_err(|_| E::custom(format!("numeric target {} is out of range", value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::custom(format!("numeric target {} is not finite", value)));
        }
        Ok(AssertionTarget::Numeric(value.trunc() as i64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(AssertionTarget::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(AssertionTarget::Text(value))
    }
}

impl<'de> Deserialize<'de> for AssertionTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TargetVisitor)
    }
}

/// One check run against a probe response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assertion {
    pub kind: AssertionKind,
    pub compare: Compare,
    pub target: AssertionTarget,
    /// Header name, only meaningful for header assertions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Assertion {
    pub fn status_code(compare: Compare, code: i64) -> Self {
        Self {
            kind: AssertionKind::StatusCode,
            compare,
            target: AssertionTarget::Numeric(code),
            key: None,
        }
    }

    pub fn header(key: impl Into<String>, compare: Compare, value: impl Into<String>) -> Self {
        Self {
            kind: AssertionKind::Header,
            compare,
            target: AssertionTarget::Text(value.into()),
            key: Some(key.into()),
        }
    }

    pub fn text_body(compare: Compare, value: impl Into<String>) -> Self {
        Self {
            kind: AssertionKind::TextBody,
            compare,
            target: AssertionTarget::Text(value.into()),
            key: None,
        }
    }
}

/// Request sent by an HTTP monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }
}

/// Connection made by a TCP monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpRequest {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Http(HttpRequest),
    Tcp(TcpRequest),
}

impl Request {
    pub fn kind(&self) -> MonitorKind {
        match self {
            Request::Http(_) => MonitorKind::Http,
            Request::Tcp(_) => MonitorKind::Tcp,
        }
    }
}

/// Declared definition of one monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MonitorDocument", into = "MonitorDocument")]
pub struct MonitorSpec {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub active: bool,
    pub public: bool,
    pub retry: u32,
    pub regions: Vec<Region>,
    /// Milliseconds before a response counts as degraded
    pub degraded_after: Option<u64>,
    /// Milliseconds before a request times out
    pub timeout: Option<u64>,
    pub request: Request,
    pub assertions: Vec<Assertion>,
}

impl MonitorSpec {
    /// A minimal active HTTP GET monitor, mostly useful as a starting point
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            frequency: Frequency::TenMinutes,
            active: true,
            public: false,
            retry: 0,
            regions: Vec::new(),
            degraded_after: None,
            timeout: None,
            request: Request::Http(HttpRequest::get(url)),
            assertions: Vec::new(),
        }
    }

    pub fn tcp(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            request: Request::Tcp(TcpRequest {
                host: host.into(),
                port,
            }),
            ..Self::http(name, String::new())
        }
    }

    pub fn kind(&self) -> MonitorKind {
        self.request.kind()
    }

    /// URL for HTTP monitors, `host:port` for TCP monitors
    pub fn endpoint(&self) -> String {
        match &self.request {
            Request::Http(http) => http.url.clone(),
            Request::Tcp(tcp) => format!("{}:{}", tcp.host, tcp.port),
        }
    }
}

/// On-disk shape of a monitor: a flat request discriminated by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MonitorDocument {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    frequency: Frequency,
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    active: bool,
    kind: MonitorKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    retry: u32,
    #[serde(default)]
    public: bool,
    request: RequestDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    degraded_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    assertions: Vec<Assertion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<Method>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<MonitorDocument> for MonitorSpec {
    type Error = String;

    fn try_from(doc: MonitorDocument) -> Result<Self, Self::Error> {
        let name = doc.name;
        let raw = doc.request;

        let request = match doc.kind {
            MonitorKind::Http => {
                if raw.host.is_some() || raw.port.is_some() {
                    return Err(format!(
                        "monitor '{}': an http request cannot set host or port",
                        name
                    ));
                }
                let url = non_empty(raw.url)
                    .ok_or_else(|| format!("monitor '{}': an http request needs a url", name))?;
                Request::Http(HttpRequest {
                    url,
                    method: raw.method.unwrap_or_default(),
                    headers: raw.headers,
                    body: raw.body.unwrap_or_default(),
                })
            }
            MonitorKind::Tcp => {
                if raw.url.is_some()
                    || raw.method.is_some()
                    || raw.body.is_some()
                    || !raw.headers.is_empty()
                {
                    return Err(format!(
                        "monitor '{}': a tcp request only accepts host and port",
                        name
                    ));
                }
                let host = non_empty(raw.host)
                    .ok_or_else(|| format!("monitor '{}': a tcp request needs a host", name))?;
                let port = raw
                    .port
                    .ok_or_else(|| format!("monitor '{}': a tcp request needs a port", name))?;
                Request::Tcp(TcpRequest { host, port })
            }
        };

        Ok(MonitorSpec {
            name,
            description: doc.description,
            frequency: doc.frequency,
            active: doc.active,
            public: doc.public,
            retry: doc.retry,
            regions: doc.regions,
            degraded_after: doc.degraded_after,
            timeout: doc.timeout,
            request,
            assertions: doc.assertions,
        })
    }
}

impl From<MonitorSpec> for MonitorDocument {
    fn from(spec: MonitorSpec) -> Self {
        let kind = spec.kind();
        let request = match spec.request {
            Request::Http(http) => RequestDocument {
                url: Some(http.url),
                method: Some(http.method),
                headers: http.headers,
                body: Some(http.body).filter(|b| !b.is_empty()),
                ..RequestDocument::default()
            },
            Request::Tcp(tcp) => RequestDocument {
                host: Some(tcp.host),
                port: Some(tcp.port),
                ..RequestDocument::default()
            },
        };

        MonitorDocument {
            name: spec.name,
            description: spec.description,
            frequency: spec.frequency,
            regions: spec.regions,
            active: spec.active,
            kind,
            retry: spec.retry,
            public: spec.public,
            request,
            degraded_after: spec.degraded_after,
            timeout: spec.timeout,
            assertions: spec.assertions,
        }
    }
}
