//! Crate-owned request metadata and client-key derivation.
//!
//! The gate never touches a framework's request type. Embedders copy the handful of
//! admission-relevant fields into a [`GateRequest`], which keeps the crate usable from
//! any HTTP stack and keeps tests free of transport plumbing.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Key the limiter buckets state under, derived from network-address signals.
///
/// Stable per observed source, not per human user: clients behind one NAT or proxy hop
/// share a key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientKey(String);
impl ClientKey {
	/// Key used when no address signal is present on the request.
	pub const UNKNOWN: &'static str = "unknown";

	/// Wraps a derived key value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}
}
impl AsRef<str> for ClientKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ClientKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ClientKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClientKey({})", self.0)
	}
}
impl Display for ClientKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Admission-relevant slice of an inbound HTTP request.
///
/// Address fields are taken at face value: the gate assumes it runs behind a trusted
/// proxy layer that controls `X-Forwarded-For`/`X-Real-IP`. A caller that can reach the
/// gate directly can spoof its key; that is a documented deployment limitation, not
/// something this layer defends against.
#[derive(Clone, Default)]
pub struct GateRequest {
	/// `X-Forwarded-For` header value, verbatim.
	pub forwarded_for: Option<String>,
	/// `X-Real-IP` header value, verbatim.
	pub real_ip: Option<String>,
	/// Transport-layer remote address, if the server exposes one.
	pub remote_addr: Option<String>,
	/// Socket-layer remote address, if the server exposes one.
	pub socket_addr: Option<String>,
	/// Request-level IP field populated by some frameworks.
	pub request_ip: Option<String>,
	/// Raw `Authorization` header value, verbatim.
	pub authorization: Option<String>,
}
impl GateRequest {
	/// Creates an empty request; populate it with the `with_*` helpers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the `X-Forwarded-For` header value.
	pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
		self.forwarded_for = Some(value.into());

		self
	}

	/// Sets the `X-Real-IP` header value.
	pub fn with_real_ip(mut self, value: impl Into<String>) -> Self {
		self.real_ip = Some(value.into());

		self
	}

	/// Sets the transport-layer remote address.
	pub fn with_remote_addr(mut self, value: impl Into<String>) -> Self {
		self.remote_addr = Some(value.into());

		self
	}

	/// Sets the socket-layer remote address.
	pub fn with_socket_addr(mut self, value: impl Into<String>) -> Self {
		self.socket_addr = Some(value.into());

		self
	}

	/// Sets the request-level IP field.
	pub fn with_request_ip(mut self, value: impl Into<String>) -> Self {
		self.request_ip = Some(value.into());

		self
	}

	/// Sets the raw `Authorization` header value.
	pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
		self.authorization = Some(value.into());

		self
	}

	/// Derives the limiter key; first non-empty signal wins.
	///
	/// Resolution order: forwarded-for header (first hop), real-ip header, transport
	/// remote address, socket remote address, request-level IP field, then the literal
	/// [`ClientKey::UNKNOWN`].
	pub fn client_key(&self) -> ClientKey {
		let forwarded = self
			.forwarded_for
			.as_deref()
			.and_then(|value| value.split(',').next())
			.map(str::trim)
			.filter(|value| !value.is_empty());
		let candidate = forwarded
			.or_else(|| non_empty(self.real_ip.as_deref()))
			.or_else(|| non_empty(self.remote_addr.as_deref()))
			.or_else(|| non_empty(self.socket_addr.as_deref()))
			.or_else(|| non_empty(self.request_ip.as_deref()));

		ClientKey::new(candidate.unwrap_or(ClientKey::UNKNOWN))
	}
}

impl Debug for GateRequest {
	// The raw `Authorization` header never reaches logs.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GateRequest")
			.field("forwarded_for", &self.forwarded_for)
			.field("real_ip", &self.real_ip)
			.field("remote_addr", &self.remote_addr)
			.field("socket_addr", &self.socket_addr)
			.field("request_ip", &self.request_ip)
			.field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
