use core::net::Ipv4Addr;

/// Directed broadcast address of the subnet `ip` lives in.
pub fn broadcast_address(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}

/// Prefix length of a netmask, `None` when the ones are not contiguous.
pub fn prefix_len(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) == 0 {
        Some(ones as u8)
    } else {
        None
    }
}

pub fn same_subnet(a: Ipv4Addr, b: Ipv4Addr, mask: Ipv4Addr) -> bool {
    let mask = u32::from(mask);
    u32::from(a) & mask == u32::from(b) & mask
}

#[cfg(feature = "esp32c3")]
pub use udp::UdpBroadcaster;

#[cfg(feature = "esp32c3")]
mod udp {
    use core::net::Ipv4Addr;

    use embassy_net::{
        udp::{PacketMetadata, UdpSocket},
        IpAddress, IpEndpoint, Ipv4Address, Stack,
    };

    use crate::error::{Error, Result};
    use crate::frame::FrameSink;

    /// UDP socket bound to the local port, sending every frame to the subnet broadcast address.
    pub struct UdpBroadcaster<'a> {
        socket: UdpSocket<'a>,
        target: IpEndpoint,
    }

    impl<'a> UdpBroadcaster<'a> {
        pub fn new(
            stack: Stack<'a>,
            port: u16,
            broadcast: Ipv4Addr,
            rx_meta: &'a mut [PacketMetadata],
            rx_buffer: &'a mut [u8],
            tx_meta: &'a mut [PacketMetadata],
            tx_buffer: &'a mut [u8],
        ) -> Result<Self> {
            let mut socket = UdpSocket::new(stack, rx_meta, rx_buffer, tx_meta, tx_buffer);

            if socket.bind(port).is_err() {
                error!("Failed to bind UDP socket to port {}", port);
                return Err(Error::Network);
            }

            let [a, b, c, d] = broadcast.octets();
            info!("Broadcasting to {}.{}.{}.{}:{}", a, b, c, d, port);

            Ok(Self {
                socket,
                target: IpEndpoint::new(IpAddress::Ipv4(Ipv4Address::new(a, b, c, d)), port),
            })
        }
    }

    impl FrameSink for UdpBroadcaster<'_> {
        async fn send(&mut self, frame: &[u8]) -> Result<()> {
            self.socket
                .send_to(frame, self.target)
                .await
                .map_err(|_| Error::Network)
        }
    }
}
