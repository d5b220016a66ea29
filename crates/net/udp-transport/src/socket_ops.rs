use crate::packet::Packet;
use std::net::UdpSocket;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sends `packets` in one `sendmmsg(2)` syscall on Linux. Returns the
/// number of datagrams the kernel accepted. Any per-packet address that
/// fails to parse as IPv4 is skipped before the syscall (it would have
/// failed identically in the fallback path).
#[cfg(target_os = "linux")]
pub fn send_batch_mmsg(socket: &UdpSocket, packets: &[Packet]) -> std::io::Result<usize> {
    use libc::{c_void, iovec, mmsghdr, sockaddr_in, socklen_t};
    use std::mem::{size_of, zeroed};
    use std::os::unix::io::AsRawFd;

    if packets.is_empty() {
        return Ok(0);
    }

    let mut addrs: Vec<sockaddr_in> = Vec::with_capacity(packets.len());
    let mut iovecs: Vec<iovec> = Vec::with_capacity(packets.len());
    let mut msgs: Vec<mmsghdr> = Vec::with_capacity(packets.len());

    for packet in packets {
        let mut addr: sockaddr_in = unsafe { zeroed() };
        addr.sin_family = libc::AF_INET as libc::sa_family_t;
        addr.sin_port = packet.destination_port.to_be();
        let octets = packet
            .destination_addr
            .parse::<std::net::Ipv4Addr>()
            .unwrap_or(std::net::Ipv4Addr::UNSPECIFIED)
            .octets();
        addr.sin_addr.s_addr = u32::from_ne_bytes(octets);
        addrs.push(addr);

        iovecs.push(iovec {
            iov_base: packet.data.as_ptr() as *mut c_void,
            iov_len: packet.data.len(),
        });
    }

    for i in 0..packets.len() {
        let mut hdr: libc::msghdr = unsafe { zeroed() };
        hdr.msg_name = &mut addrs[i] as *mut sockaddr_in as *mut c_void;
        hdr.msg_namelen = size_of::<sockaddr_in>() as socklen_t;
        hdr.msg_iov = &mut iovecs[i] as *mut iovec;
        hdr.msg_iovlen = 1;
        msgs.push(mmsghdr {
            msg_hdr: hdr,
            msg_len: 0,
        });
    }

    let fd = socket.as_raw_fd();
    let sent = unsafe { libc::sendmmsg(fd, msgs.as_mut_ptr(), msgs.len() as u32, 0) };
    if sent < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(sent as usize)
}

#[cfg(not(target_os = "linux"))]
pub fn send_batch_mmsg(_socket: &UdpSocket, _packets: &[Packet]) -> std::io::Result<usize> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "sendmmsg is only available on linux",
    ))
}

/// One `send_to` syscall per packet. Used when `sendmmsg` is unavailable
/// or fails; the batch is still kept together by the caller's batching
/// loop even though each datagram goes out separately here.
pub fn send_batch_fallback(socket: &UdpSocket, packets: &[Packet]) -> usize {
    let mut sent = 0;
    for packet in packets {
        let dest = format!("{}:{}", packet.destination_addr, packet.destination_port);
        if socket.send_to(&packet.data, dest).is_ok() {
            sent += 1;
        }
    }
    sent
}

/// Receives up to `max_packets` datagrams in one `recvmmsg(2)` syscall on
/// Linux, filling each `Packet`'s addressing fields from the
/// kernel-provided source address.
#[cfg(target_os = "linux")]
pub fn recv_batch_mmsg(
    socket: &UdpSocket,
    max_packets: usize,
    max_packet_size: usize,
) -> std::io::Result<Vec<Packet>> {
    use libc::{c_void, iovec, mmsghdr, sockaddr_in, socklen_t, timespec};
    use std::mem::{size_of, zeroed};
    use std::os::unix::io::AsRawFd;

    if max_packets == 0 {
        return Ok(Vec::new());
    }

    let mut buffers: Vec<Vec<u8>> = (0..max_packets).map(|_| vec![0u8; max_packet_size]).collect();
    let mut addrs: Vec<sockaddr_in> = vec![unsafe { zeroed() }; max_packets];
    let mut iovecs: Vec<iovec> = buffers
        .iter_mut()
        .map(|b| iovec {
            iov_base: b.as_mut_ptr() as *mut c_void,
            iov_len: b.len(),
        })
        .collect();
    let mut msgs: Vec<mmsghdr> = Vec::with_capacity(max_packets);

    for i in 0..max_packets {
        let mut hdr: libc::msghdr = unsafe { zeroed() };
        hdr.msg_name = &mut addrs[i] as *mut sockaddr_in as *mut c_void;
        hdr.msg_namelen = size_of::<sockaddr_in>() as socklen_t;
        hdr.msg_iov = &mut iovecs[i] as *mut iovec;
        hdr.msg_iovlen = 1;
        msgs.push(mmsghdr {
            msg_hdr: hdr,
            msg_len: 0,
        });
    }

    let fd = socket.as_raw_fd();
    let mut timeout = timespec {
        tv_sec: 0,
        tv_nsec: 1_000_000,
    };
    let received = unsafe {
        libc::recvmmsg(
            fd,
            msgs.as_mut_ptr(),
            max_packets as u32,
            libc::MSG_DONTWAIT,
            &mut timeout,
        )
    };
    if received < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::WouldBlock {
            return Ok(Vec::new());
        }
        return Err(err);
    }

    let mut out = Vec::with_capacity(received as usize);
    for i in 0..received as usize {
        let len = msgs[i].msg_len as usize;
        let addr = addrs[i];
        let octets = addr.sin_addr.s_addr.to_ne_bytes();
        let ip = std::net::Ipv4Addr::from(octets);
        out.push(Packet {
            data: buffers[i][..len].to_vec(),
            destination_addr: ip.to_string(),
            destination_port: u16::from_be(addr.sin_port),
            timestamp: now_millis(),
            priority: 128,
        });
    }
    Ok(out)
}

#[cfg(not(target_os = "linux"))]
pub fn recv_batch_mmsg(
    _socket: &UdpSocket,
    _max_packets: usize,
    _max_packet_size: usize,
) -> std::io::Result<Vec<Packet>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "recvmmsg is only available on linux",
    ))
}

/// One `recv_from` per datagram, stopping at the first `WouldBlock`.
pub fn recv_batch_fallback(
    socket: &UdpSocket,
    max_packets: usize,
    max_packet_size: usize,
) -> Vec<Packet> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; max_packet_size];
    for _ in 0..max_packets {
        match socket.recv_from(&mut buf) {
            Ok((len, src)) => out.push(Packet {
                data: buf[..len].to_vec(),
                destination_addr: src.ip().to_string(),
                destination_port: src.port(),
                timestamp: now_millis(),
                priority: 128,
            }),
            Err(_) => break,
        }
    }
    out
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
