//! the `AppleSMC` user client, reached through IOKit.

use {
    super::{
        OpenError, Transport, TransportError,
        wire::{KERNEL_INDEX_SMC, KeyData},
    },
    std::{
        ffi::{c_char, c_void},
        mem::size_of,
        ptr,
    },
};

#[allow(non_camel_case_types)]
type kern_return_t = i32;
#[allow(non_camel_case_types)]
type mach_port_t = u32;
#[allow(non_camel_case_types)]
type io_object_t = u32;
#[allow(non_camel_case_types)]
type io_connect_t = u32;

const KERN_SUCCESS: kern_return_t = 0;
const IO_OBJECT_NULL: io_object_t = 0;
const K_IO_MAIN_PORT_DEFAULT: mach_port_t = 0;

#[link(name = "IOKit", kind = "framework")]
unsafe extern "C" {
    fn IOServiceMatching(name: *const c_char) -> *mut c_void;
    fn IOServiceGetMatchingService(main_port: mach_port_t, matching: *mut c_void) -> io_object_t;
    fn IOServiceOpen(
        service: io_object_t,
        owning_task: mach_port_t,
        kind: u32,
        connect: *mut io_connect_t,
    ) -> kern_return_t;
    fn IOServiceClose(connect: io_connect_t) -> kern_return_t;
    fn IOObjectRelease(object: io_object_t) -> kern_return_t;
    fn IOConnectCallStructMethod(
        connection: io_connect_t,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> kern_return_t;
}

unsafe extern "C" {
    fn mach_task_self() -> mach_port_t;
}

/// an open connection to the `AppleSMC` service. closed on drop.
#[derive(Debug)]
pub struct IoKit {
    conn: io_connect_t,
}

// === impl IoKit ===

impl Transport for IoKit {
    fn open() -> Result<Self, OpenError> {
        // SAFETY: the service name is a nul-terminated static string. `IOServiceGetMatchingService`
        // consumes the matching dictionary, so it is not released here.
        let service = unsafe {
            let matching = IOServiceMatching(c"AppleSMC".as_ptr());
            if matching.is_null() {
                return Err(OpenError::NoService);
            }
            IOServiceGetMatchingService(K_IO_MAIN_PORT_DEFAULT, matching)
        };
        if service == IO_OBJECT_NULL {
            return Err(OpenError::NoService);
        }

        let mut conn: io_connect_t = 0;
        // SAFETY: `service` is a valid object reference owned by us, released right after use.
        let code = unsafe {
            let code = IOServiceOpen(service, mach_task_self(), 0, &mut conn);
            IOObjectRelease(service);
            code
        };

        match code {
            KERN_SUCCESS => Ok(Self { conn }),
            code => Err(OpenError::Refused(code)),
        }
    }

    fn call(&self, input: &KeyData) -> Result<KeyData, TransportError> {
        let Self { conn } = *self;

        let mut output = KeyData::default();
        let mut output_size = size_of::<KeyData>();
        // SAFETY: both buffers are `repr(C)` records of the size passed alongside them, and live
        // for the duration of the call.
        let code = unsafe {
            IOConnectCallStructMethod(
                conn,
                KERNEL_INDEX_SMC,
                ptr::from_ref(input).cast(),
                size_of::<KeyData>(),
                ptr::from_mut(&mut output).cast(),
                &mut output_size,
            )
        };

        match code {
            KERN_SUCCESS => Ok(output),
            code => Err(TransportError(code)),
        }
    }
}

impl Drop for IoKit {
    fn drop(&mut self) {
        // SAFETY: the connection was opened by `IOServiceOpen` and is closed exactly once.
        unsafe {
            IOServiceClose(self.conn);
        }
    }
}
