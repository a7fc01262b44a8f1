//! the record exchanged with the `AppleSMC` user client.
//!
//! the layout must match the kernel driver's, so it is `repr(C)`: 80 bytes in total.

/// the user client method that takes and returns a [`KeyData`].
pub const KERNEL_INDEX_SMC: u32 = 2;

/// `data8` command: read the payload of a key.
pub const CMD_READ_BYTES: u8 = 5;
/// `data8` command: read the size and data type of a key.
pub const CMD_READ_KEYINFO: u8 = 9;

/// the largest payload a key may carry.
pub const PAYLOAD_LEN: usize = 32;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerLimits {
    pub version: u16,
    pub length: u16,
    pub cpu_limit: u32,
    pub gpu_limit: u32,
    pub mem_limit: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyInfo {
    /// payload size in bytes.
    pub data_size: u32,
    /// the value's data type, a big-endian four-character code.
    pub data_type: u32,
    pub data_attributes: u8,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyData {
    /// the key, a big-endian four-character code.
    pub key: u32,
    pub vers: Version,
    pub power_limits: PowerLimits,
    pub key_info: KeyInfo,
    /// zero on success.
    pub result: u8,
    pub status: u8,
    /// the command, one of the `CMD_*` constants.
    pub data8: u8,
    pub data32: u32,
    pub bytes: [u8; PAYLOAD_LEN],
}

const _: () = assert!(std::mem::size_of::<KeyData>() == 80);
