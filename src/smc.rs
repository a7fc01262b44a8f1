//! a read-only client for the system management controller (smc).
//!
//! the smc exposes sensors as four-character keys. reading a key is a two-phase exchange: a
//! `READ_KEYINFO` request resolves the key's payload size and data type, then a `READ_BYTES`
//! request carrying that size returns the payload.

use {
    self::wire::{CMD_READ_BYTES, CMD_READ_KEYINFO, KeyData, PAYLOAD_LEN},
    log::{trace, warn},
    std::fmt::{self, Display},
};

pub use self::{
    decode::{Encoding, decode},
    key::{FourCc, FourCcParseError},
};

mod decode;
mod key;
pub mod wire;

#[cfg(target_os = "macos")]
mod iokit;

#[cfg(test)]
pub(crate) mod mock;


/// the host's default smc transport.
#[cfg(target_os = "macos")]
pub type HostTransport = self::iokit::IoKit;

/// the host's default smc transport.
#[cfg(not(target_os = "macos"))]
pub type HostTransport = Unsupported;

/// a request/response channel to the smc.
pub trait Transport {
    /// opens a session with the smc.
    fn open() -> Result<Self, OpenError>
    where
        Self: Sized;

    /// sends one request, returning the controller's response.
    fn call(&self, input: &KeyData) -> Result<KeyData, TransportError>;
}

/// a transport for hosts without an smc. it can never be opened.
#[derive(Debug)]
pub enum Unsupported {}

/// a session with the smc.
///
/// if the session could not be opened, the client is closed and every read fails with
/// [`ReadError::Closed`]. the session is released when the client is dropped.
pub struct SensorKeyClient<T = HostTransport> {
    transport: Option<T>,
}

/// the raw value of a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reading {
    pub key: FourCc,
    pub data_type: FourCc,
    size: usize,
    bytes: [u8; PAYLOAD_LEN],
}

/// the smc session could not be opened.
#[derive(Debug, Eq, PartialEq)]
pub enum OpenError {
    /// no smc service on this host.
    NoService,
    /// the service exists, but refused the connection.
    Refused(i32),
}

/// a key could not be read.
///
/// callers treat every variant alike, as an absent reading: keys missing from a host are
/// expected, and a busy controller is indistinguishable from a missing key.
#[derive(Debug, Eq, PartialEq)]
pub enum ReadError {
    /// the session is not open.
    Closed,
    InvalidKey(FourCcParseError),
    Transport(TransportError),
    /// the controller answered, but reported a failure.
    Unsuccessful { result: u8 },
    /// the key claims a payload larger than a response can carry.
    Oversize { size: u32 },
}

/// a request did not complete; holds the kernel return code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransportError(pub i32);

// === impl Unsupported ===

impl Transport for Unsupported {
    fn open() -> Result<Self, OpenError> {
        Err(OpenError::NoService)
    }

    fn call(&self, _: &KeyData) -> Result<KeyData, TransportError> {
        match *self {}
    }
}

// === impl SensorKeyClient ===

impl<T: Transport> SensorKeyClient<T> {
    /// opens a session, falling back to a closed client if the smc is unavailable.
    pub fn open() -> Self {
        match T::open() {
            Ok(transport) => Self::with_transport(transport),
            Err(error) => {
                warn!("smc unavailable, fan and thermal readings disabled: {error}");
                Self::closed()
            }
        }
    }

    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// a client whose every read fails.
    pub fn closed() -> Self {
        Self { transport: None }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// reads the raw value of `key`.
    ///
    /// nothing is retried, and no key metadata is cached between calls.
    pub fn read(&self, key: &str) -> Result<Reading, ReadError> {
        let transport = self.transport.as_ref().ok_or(ReadError::Closed)?;
        let key = key.parse::<FourCc>().map_err(ReadError::InvalidKey)?;
        let code = u32::from(key);

        let info = Self::exchange(
            transport,
            KeyData {
                key: code,
                data8: CMD_READ_KEYINFO,
                ..KeyData::default()
            },
        )?
        .key_info;

        let size = info.data_size;
        if size as usize > PAYLOAD_LEN {
            return Err(ReadError::Oversize { size });
        }

        let mut request = KeyData {
            key: code,
            data8: CMD_READ_BYTES,
            ..KeyData::default()
        };
        request.key_info.data_size = size;
        let response = Self::exchange(transport, request)?;

        let reading = Reading {
            key,
            data_type: FourCc::from(info.data_type),
            size: size as usize,
            bytes: response.bytes,
        };
        trace!("smc {key}: {} {:02x?}", reading.data_type, reading.bytes());
        Ok(reading)
    }

    /// reads `key` and decodes it as a float.
    pub fn read_value(&self, key: &str) -> Result<f32, ReadError> {
        self.read(key).map(|reading| reading.value())
    }

    fn exchange(transport: &T, request: KeyData) -> Result<KeyData, ReadError> {
        let response = transport.call(&request).map_err(ReadError::Transport)?;
        match response.result {
            0 => Ok(response),
            result => Err(ReadError::Unsuccessful { result }),
        }
    }
}

// === impl Reading ===

impl Reading {
    /// the payload, truncated to the key's declared size.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.size]
    }

    /// decodes the payload according to its data type.
    pub fn value(&self) -> f32 {
        decode(self.data_type, self.bytes())
    }
}

// === impl OpenError ===

impl Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoService => f.write_str("no AppleSMC service"),
            Self::Refused(code) => write!(f, "AppleSMC refused the connection ({code:#x})"),
        }
    }
}

impl std::error::Error for OpenError {}

// === impl ReadError ===

impl Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("smc session is closed"),
            Self::InvalidKey(error) => write!(f, "invalid key: {error}"),
            Self::Transport(TransportError(code)) => write!(f, "smc call failed ({code:#x})"),
            Self::Unsuccessful { result } => write!(f, "smc reported failure ({result})"),
            Self::Oversize { size } => write!(f, "payload of {size} bytes is too large"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidKey(error) => Some(error),
            _ => None,
        }
    }
}
