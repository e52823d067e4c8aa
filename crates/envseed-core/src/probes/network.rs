//! Network identity probes — hostname and the interface table.
//!
//! Interface names, flags, and addresses (including netmasks and
//! point-to-point destinations) pin down which machine and network this
//! process runs on. Socket addresses go through [`SockaddrRecord`], which
//! truncates each to the fields its address family defines.

use std::ffi::CStr;

use crate::accumulator::{write_terminated, Accumulate, Address, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};
use crate::records::SockaddrRecord;

pub struct HostnameProbe;

static HOSTNAME_INFO: ProbeInfo = ProbeInfo {
    name: "hostname",
    description: "gethostname(2)",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for HostnameProbe {
    fn info(&self) -> &ProbeInfo {
        &HOSTNAME_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let mut buf = [0u8; 256];
        // SAFETY: gethostname writes at most buf.len() bytes into a valid
        // buffer.
        let ret = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
        if ret == 0 {
            let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            acc.write(&buf[..len]);
        }
    }
}

pub struct InterfaceProbe;

static INTERFACE_INFO: ProbeInfo = ProbeInfo {
    name: "interfaces",
    description: "Every network interface: name, flags, address, netmask, destination",
    cadence: Cadence::Static,
};

/// Point-to-point destination / broadcast slot; the libc field name differs
/// between platforms.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn destination(ifa: &libc::ifaddrs) -> *const libc::sockaddr {
    ifa.ifa_ifu
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn destination(ifa: &libc::ifaddrs) -> *const libc::sockaddr {
    ifa.ifa_dstaddr
}

impl EnvironmentProbe for InterfaceProbe {
    fn info(&self) -> &ProbeInfo {
        &INTERFACE_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let mut ifap: *mut libc::ifaddrs = std::ptr::null_mut();
        // SAFETY: getifaddrs allocates a list we walk below and release with
        // freeifaddrs exactly once.
        if unsafe { libc::getifaddrs(&mut ifap) } != 0 {
            return;
        }

        let mut cursor = ifap;
        while !cursor.is_null() {
            // SAFETY: cursor is a live node of the list until freeifaddrs.
            let ifa = unsafe { &*cursor };

            // The node address itself is heap-placement entropy.
            Address(cursor as usize).accumulate(acc);

            if !ifa.ifa_name.is_null() {
                // SAFETY: ifa_name is NUL-terminated for live nodes.
                let name = unsafe { CStr::from_ptr(ifa.ifa_name) };
                write_terminated(acc, name.to_bytes());
            }
            (ifa.ifa_flags as u32).accumulate(acc);

            for sa in [
                ifa.ifa_addr as *const libc::sockaddr,
                ifa.ifa_netmask as *const libc::sockaddr,
                destination(ifa),
            ] {
                // SAFETY: non-null pointers from getifaddrs reference valid
                // sockaddrs of at least their family's size.
                if let Some(record) = unsafe { SockaddrRecord::from_raw(sa) } {
                    record.accumulate(acc);
                }
            }

            cursor = ifa.ifa_next;
        }

        // SAFETY: ifap came from a successful getifaddrs and is freed once.
        unsafe { libc::freeifaddrs(ifap) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_probe_is_deterministic() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        HostnameProbe.sample(&mut a);
        HostnameProbe.sample(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn interface_probe_contributes_bytes() {
        let mut sink = Vec::new();
        InterfaceProbe.sample(&mut sink);
        // Any machine with at least a loopback interface contributes.
        assert!(!sink.is_empty());
    }
}
