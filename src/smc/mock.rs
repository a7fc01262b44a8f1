//! a mock smc, answering the two-phase protocol from a table of keys.

use {
    super::{
        FourCc, OpenError, Transport, TransportError,
        wire::{CMD_READ_BYTES, CMD_READ_KEYINFO, KeyData},
    },
    std::{collections::HashMap, sync::Mutex},
};

/// the smc's "key not found" result code.
pub const KEY_NOT_FOUND: u8 = 132;

/// how a request for a key fails.
#[derive(Clone, Copy, Debug)]
pub enum Failure {
    /// the smc answers with a non-zero result code.
    Result(u8),
    /// the call itself fails.
    Transport(i32),
}

#[derive(Default)]
pub struct MockSmc {
    keys: HashMap<u32, (u32, Vec<u8>)>,
    /// failures, by key and command.
    failures: HashMap<(u32, u8), Failure>,
    /// metadata sizes that disagree with the stored payload, by key.
    sizes: HashMap<u32, u32>,
    /// every request received, in order.
    pub requests: Mutex<Vec<KeyData>>,
}

impl MockSmc {
    pub fn new() -> Self {
        Self::default()
    }

    /// adds a key holding `bytes` of data type `data_type`.
    pub fn with(mut self, key: &str, data_type: &str, bytes: &[u8]) -> Self {
        let key = key.parse::<FourCc>().unwrap().into();
        let data_type = data_type.parse::<FourCc>().unwrap().into();
        self.keys.insert(key, (data_type, bytes.to_vec()));
        self
    }

    /// fails requests for `key` carrying `command`.
    pub fn failing(mut self, key: &str, command: u8, failure: Failure) -> Self {
        let key = key.parse::<FourCc>().unwrap().into();
        self.failures.insert((key, command), failure);
        self
    }

    /// reports `size` in the metadata of `key`, whatever its payload holds.
    pub fn reporting(mut self, key: &str, size: u32) -> Self {
        let key = key.parse::<FourCc>().unwrap().into();
        self.sizes.insert(key, size);
        self
    }

    pub fn requests(&self) -> Vec<KeyData> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockSmc {
    fn open() -> Result<Self, OpenError> {
        Ok(Self::default())
    }

    fn call(&self, input: &KeyData) -> Result<KeyData, TransportError> {
        self.requests.lock().unwrap().push(*input);

        let mut output = KeyData::default();
        match self.failures.get(&(input.key, input.data8)) {
            Some(Failure::Result(result)) => {
                output.result = *result;
                return Ok(output);
            }
            Some(Failure::Transport(code)) => return Err(TransportError(*code)),
            None => {}
        }

        let Some((data_type, bytes)) = self.keys.get(&input.key) else {
            output.result = KEY_NOT_FOUND;
            return Ok(output);
        };

        match input.data8 {
            CMD_READ_KEYINFO => {
                output.key_info.data_size = match self.sizes.get(&input.key) {
                    Some(size) => *size,
                    None => bytes.len() as u32,
                };
                output.key_info.data_type = *data_type;
            }
            // a payload request must carry the size resolved by the metadata request.
            CMD_READ_BYTES if input.key_info.data_size as usize == bytes.len() => {
                output.bytes[..bytes.len()].copy_from_slice(bytes);
            }
            _ => return Err(TransportError(-1)),
        }

        Ok(output)
    }
}
