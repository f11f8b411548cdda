//! Region Walker
//!
//! Opens a target process read-only, walks its committed writable
//! regions and scans each against the signature set. Bounded work per
//! process: limited region count and capped read size per region.
//!
//! Every failure path (access denied, protected process, process gone
//! mid-walk) returns None silently. Partial visibility is expected and
//! is not an error condition.

#[cfg(windows)]
mod windows_impl {
    use log::debug;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows_sys::Win32::System::Memory::{
        VirtualQueryEx, MEMORY_BASIC_INFORMATION, MEM_COMMIT, PAGE_EXECUTE_READWRITE,
        PAGE_READWRITE,
    };
    use windows_sys::Win32::System::Threading::{
        OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    use crate::constants;
    use crate::logic::memory_scan::patterns;

    /// Closes the process handle when dropped, on every exit path
    struct ProcessHandle(HANDLE);

    impl ProcessHandle {
        fn open(pid: u32) -> Option<Self> {
            // SAFETY: plain API call; a zero handle means failure
            let handle =
                unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid) };
            if handle == 0 {
                return None;
            }
            Some(Self(handle))
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: handle was returned non-zero by OpenProcess
            unsafe {
                CloseHandle(self.0);
            }
        }
    }

    pub fn scan_process(pid: u32) -> Option<(String, f64)> {
        let handle = ProcessHandle::open(pid)?;

        let mut address: usize = 0;
        let mut regions_scanned = 0usize;
        let mut buffer = vec![0u8; constants::MAX_REGION_READ];

        while regions_scanned < constants::MAX_REGIONS_PER_PROCESS {
            let mut info: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
            // SAFETY: info is a properly sized out-parameter
            let got = unsafe {
                VirtualQueryEx(
                    handle.0,
                    address as *const _,
                    &mut info,
                    std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if got == 0 {
                break; // end of address space or process gone
            }

            let readable = info.State == MEM_COMMIT
                && (info.Protect == PAGE_READWRITE || info.Protect == PAGE_EXECUTE_READWRITE);

            if readable && info.RegionSize > 0 {
                let to_read = info.RegionSize.min(constants::MAX_REGION_READ);
                let mut bytes_read = 0usize;
                // SAFETY: buffer holds at least to_read bytes
                let ok = unsafe {
                    ReadProcessMemory(
                        handle.0,
                        info.BaseAddress,
                        buffer.as_mut_ptr() as *mut _,
                        to_read,
                        &mut bytes_read,
                    )
                };
                if ok != 0 && bytes_read > 0 {
                    if let Some((name, confidence)) =
                        patterns::find_signature(&buffer[..bytes_read])
                    {
                        debug!(
                            "[MemoryScan] pid {} matched '{}' at region {:p}",
                            pid, name, info.BaseAddress
                        );
                        return Some((name.to_string(), confidence));
                    }
                }
                regions_scanned += 1;
            }

            let next = (info.BaseAddress as usize).checked_add(info.RegionSize)?;
            if next <= address {
                break; // no forward progress
            }
            address = next;
        }

        None
    }
}

#[cfg(windows)]
pub use windows_impl::scan_process;

/// Memory scanning needs the Windows process APIs; elsewhere every scan
/// comes back empty.
#[cfg(not(windows))]
pub fn scan_process(_pid: u32) -> Option<(String, f64)> {
    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_stub_returns_none() {
        assert!(scan_process(1234).is_none());
    }

    #[cfg(windows)]
    #[test]
    fn test_own_process_scan_does_not_panic() {
        // Whatever the outcome, the walk must terminate and release the
        // handle cleanly
        let _ = scan_process(std::process::id());
    }

    #[cfg(windows)]
    #[test]
    fn test_nonexistent_pid_is_silent() {
        assert!(scan_process(u32::MAX - 1).is_none());
    }
}
