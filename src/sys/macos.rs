//! mach and sysctl backed host statistics.

use {
    crate::{
        memory::{MemoryCounters, MemorySource, Usage},
        roles::Topology,
        source::HostQueryError,
        ticks::{CoreTicks, TickSource},
    },
    log::debug,
    std::{
        ffi::CString,
        io,
        mem::size_of,
        ptr,
    },
};

#[allow(non_camel_case_types)]
type kern_return_t = i32;
#[allow(non_camel_case_types)]
type mach_port_t = u32;
#[allow(non_camel_case_types)]
type natural_t = u32;

const KERN_SUCCESS: kern_return_t = 0;

const PROCESSOR_CPU_LOAD_INFO: i32 = 2;
const CPU_STATE_USER: usize = 0;
const CPU_STATE_SYSTEM: usize = 1;
const CPU_STATE_IDLE: usize = 2;
const CPU_STATE_NICE: usize = 3;
const CPU_STATE_MAX: usize = 4;

const HOST_VM_INFO64: i32 = 4;

unsafe extern "C" {
    fn mach_host_self() -> mach_port_t;
    fn mach_task_self() -> mach_port_t;
    fn host_processor_info(
        host: mach_port_t,
        flavor: i32,
        out_processor_count: *mut natural_t,
        out_processor_info: *mut *mut i32,
        out_processor_info_count: *mut u32,
    ) -> kern_return_t;
    fn host_statistics64(
        host: mach_port_t,
        flavor: i32,
        host_info_out: *mut i32,
        host_info_out_count: *mut u32,
    ) -> kern_return_t;
    fn vm_deallocate(target_task: mach_port_t, address: usize, size: usize) -> kern_return_t;
    static vm_kernel_page_size: usize;
}

/// `struct vm_statistics64`, see `<mach/vm_statistics.h>`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct VmStatistics64 {
    free_count: natural_t,
    active_count: natural_t,
    inactive_count: natural_t,
    wire_count: natural_t,
    zero_fill_count: u64,
    reactivations: u64,
    pageins: u64,
    pageouts: u64,
    faults: u64,
    cow_faults: u64,
    lookups: u64,
    hits: u64,
    purges: u64,
    purgeable_count: natural_t,
    speculative_count: natural_t,
    decompressions: u64,
    compressions: u64,
    swapins: u64,
    swapouts: u64,
    compressor_page_count: natural_t,
    throttled_count: natural_t,
    external_page_count: natural_t,
    internal_page_count: natural_t,
    total_uncompressed_pages_in_compressor: u64,
}

/// `struct xsw_usage`, the value of `vm.swapusage`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct XswUsage {
    total: u64,
    avail: u64,
    used: u64,
    pagesize: u32,
    encrypted: i32,
}

/// per-processor tick counters from `host_processor_info`.
pub struct ProcessorLoad {
    host: mach_port_t,
}

/// memory counters from `host_statistics64` and sysctl.
pub struct VmStatistics {
    host: mach_port_t,
}

/// performance tiers from `hw.perflevel{0,1}.logicalcpu`.
#[derive(Default)]
pub struct PerfLevels;

// === impl ProcessorLoad ===

impl Default for ProcessorLoad {
    fn default() -> Self {
        // SAFETY: no preconditions. the send right is held for the life of the process.
        let host = unsafe { mach_host_self() };
        Self { host }
    }
}

impl TickSource for ProcessorLoad {
    fn ticks(&self) -> Result<Vec<CoreTicks>, HostQueryError> {
        let Self { host } = *self;

        let mut processors: natural_t = 0;
        let mut info: *mut i32 = ptr::null_mut();
        let mut info_count: u32 = 0;
        // SAFETY: all three out-pointers refer to live locals.
        let code = unsafe {
            host_processor_info(
                host,
                PROCESSOR_CPU_LOAD_INFO,
                &mut processors,
                &mut info,
                &mut info_count,
            )
        };
        if code != KERN_SUCCESS {
            return Err(HostQueryError::Kernel {
                call: "host_processor_info",
                code,
            });
        }

        let ticks = {
            // SAFETY: on success the kernel hands us `info_count` integers, `CPU_STATE_MAX`
            // unsigned tick counters per processor.
            let raw = unsafe { std::slice::from_raw_parts(info.cast::<u32>(), info_count as usize) };
            raw.chunks_exact(CPU_STATE_MAX)
                .take(processors as usize)
                .map(|cpu| CoreTicks {
                    user: cpu[CPU_STATE_USER].into(),
                    system: cpu[CPU_STATE_SYSTEM].into(),
                    idle: cpu[CPU_STATE_IDLE].into(),
                    nice: cpu[CPU_STATE_NICE].into(),
                })
                .collect::<Vec<_>>()
        };

        // SAFETY: the array was allocated in our address space by the kernel and is no longer
        // referenced.
        unsafe {
            vm_deallocate(
                mach_task_self(),
                info as usize,
                info_count as usize * size_of::<i32>(),
            );
        }

        Ok(ticks)
    }
}

// === impl VmStatistics ===

impl Default for VmStatistics {
    fn default() -> Self {
        // SAFETY: no preconditions. the send right is held for the life of the process.
        let host = unsafe { mach_host_self() };
        Self { host }
    }
}

impl VmStatistics {
    fn vm_statistics(&self) -> Result<VmStatistics64, HostQueryError> {
        let mut stats = VmStatistics64::default();
        let mut count = (size_of::<VmStatistics64>() / size_of::<i32>()) as u32;
        // SAFETY: `count` is the size of `stats` in integers, as `HOST_VM_INFO64_COUNT`.
        let code = unsafe {
            host_statistics64(
                self.host,
                HOST_VM_INFO64,
                ptr::from_mut(&mut stats).cast(),
                &mut count,
            )
        };

        match code {
            KERN_SUCCESS => Ok(stats),
            code => Err(HostQueryError::Kernel {
                call: "host_statistics64",
                code,
            }),
        }
    }
}

impl MemorySource for VmStatistics {
    fn counters(&self) -> Result<MemoryCounters, HostQueryError> {
        let total = sysctl::<u64>("hw.memsize")?;
        let stats = self.vm_statistics()?;
        // SAFETY: a constant exported by the kernel, initialized before `main`.
        let page = unsafe { vm_kernel_page_size } as u64;
        let pages = |count: natural_t| u64::from(count) * page;

        let swap = sysctl::<XswUsage>("vm.swapusage")
            .inspect_err(|error| debug!("vm.swapusage: {error}"))
            .unwrap_or_default();
        let kernel_score = sysctl::<i32>("kern.memorystatus_level")
            .inspect_err(|error| debug!("kern.memorystatus_level: {error}"))
            .ok()
            .and_then(|level| u32::try_from(level).ok());

        Ok(MemoryCounters {
            total,
            free: pages(stats.free_count),
            inactive: pages(stats.inactive_count),
            usage: Usage::Categories {
                active: pages(stats.active_count),
                wired: pages(stats.wire_count),
                compressed: pages(stats.compressor_page_count),
            },
            swap_used: swap.used,
            swap_total: swap.total,
            kernel_score,
        })
    }
}

// === impl PerfLevels ===

impl Topology for PerfLevels {
    fn tiers(&self) -> Option<(usize, usize)> {
        let performance = sysctl::<i32>("hw.perflevel0.logicalcpu").ok()?;
        let efficiency = sysctl::<i32>("hw.perflevel1.logicalcpu").ok()?;
        Some((
            usize::try_from(performance).ok()?,
            usize::try_from(efficiency).ok()?,
        ))
    }
}

// === sysctl ===

/// reads a fixed-size sysctl value. `T` must be plain old data.
fn sysctl<T: Copy + Default>(name: &str) -> io::Result<T> {
    let c_name = CString::new(name)?;
    let mut value = T::default();
    let mut len = size_of::<T>();
    // SAFETY: `value` is a live `T` and `len` is its size.
    let code = unsafe {
        libc::sysctlbyname(
            c_name.as_ptr(),
            ptr::from_mut(&mut value).cast(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };

    if code != 0 {
        return Err(io::Error::last_os_error());
    }
    if len != size_of::<T>() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{name} is {len} bytes, expected {}", size_of::<T>()),
        ));
    }

    Ok(value)
}

/// reads a string sysctl value.
pub fn sysctl_string(name: &str) -> Option<String> {
    let c_name = CString::new(name).ok()?;

    let mut len = 0usize;
    // SAFETY: a null output buffer asks only for the value's length.
    let code = unsafe {
        libc::sysctlbyname(
            c_name.as_ptr(),
            ptr::null_mut(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if code != 0 || len == 0 {
        return None;
    }

    let mut buf = vec![0u8; len];
    // SAFETY: `buf` is `len` bytes long.
    let code = unsafe {
        libc::sysctlbyname(
            c_name.as_ptr(),
            buf.as_mut_ptr().cast(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if code != 0 {
        return None;
    }

    buf.truncate(len);
    let value = String::from_utf8_lossy(&buf);
    Some(value.trim_end_matches('\0').to_owned())
}
