//! Soft access point and the embassy-net stack on top of it.

use embassy_executor::Spawner;
use embassy_net::{
    Config as NetConfig, Ipv4Address, Ipv4Cidr, Runner, Stack, StackResources, StaticConfigV4,
};
use embassy_time::Timer;
use esp_hal::peripherals::WIFI;
use esp_wifi::{
    wifi::{
        AccessPointConfiguration, AuthMethod, Configuration, WifiApDevice, WifiController,
        WifiDevice, WifiEvent, WifiState,
    },
    EspWifiController,
};
use static_cell::StaticCell;

use crate::config::{Config, ConfigError};
use crate::error::{Error, Result};
use crate::net;

// One UDP socket plus headroom for the stack's own sockets.
const SOCKETS: usize = 3;

static RESOURCES: StaticCell<StackResources<SOCKETS>> = StaticCell::new();

fn to_smoltcp(ip: core::net::Ipv4Addr) -> Ipv4Address {
    let [a, b, c, d] = ip.octets();
    Ipv4Address::new(a, b, c, d)
}

/// Starts the access point and returns a stack whose link is up.
pub async fn start_access_point(
    spawner: Spawner,
    wifi_init: &'static EspWifiController<'static>,
    wifi: WIFI,
    config: &'static Config,
    seed: u64,
) -> Result<Stack<'static>> {
    let (device, controller) = esp_wifi::wifi::new_with_mode(wifi_init, wifi, WifiApDevice)
        .map_err(|_| Error::Network)?;

    let prefix = net::prefix_len(config.subnet).ok_or(ConfigError::SubnetMask)?;
    let net_config = NetConfig::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(to_smoltcp(config.local_ip), prefix),
        gateway: Some(to_smoltcp(config.gateway)),
        dns_servers: Default::default(),
    });

    let (stack, runner) = embassy_net::new(
        device,
        net_config,
        RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner
        .spawn(access_point(controller, config))
        .map_err(|_| Error::Network)?;
    spawner.spawn(net_task(runner)).map_err(|_| Error::Network)?;

    while !stack.is_link_up() {
        Timer::after_millis(500).await;
    }

    let [a, b, c, d] = config.local_ip.octets();
    info!("Access point '{}' up at {}.{}.{}.{}", config.ssid, a, b, c, d);

    Ok(stack)
}

#[embassy_executor::task]
async fn access_point(mut controller: WifiController<'static>, config: &'static Config) -> ! {
    loop {
        if esp_wifi::wifi::wifi_state() == WifiState::ApStarted {
            controller.wait_for_event(WifiEvent::ApStop).await;
            warn!("Access point stopped, restarting");
            Timer::after_millis(5_000).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let auth_method = if config.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };

            // Lengths were checked by Config::validate at boot.
            let (Ok(ssid), Ok(password)) = (config.ssid.try_into(), config.password.try_into())
            else {
                error!("SSID or password does not fit the driver buffers");
                loop {
                    Timer::after_millis(1_000).await;
                }
            };

            let ap = Configuration::AccessPoint(AccessPointConfiguration {
                ssid,
                password,
                auth_method,
                ..Default::default()
            });

            if controller.set_configuration(&ap).is_err() {
                error!("Rejected access point configuration");
            }

            debug!("Starting access point");
            if controller.start_async().await.is_err() {
                error!("Access point failed to start, retrying");
                Timer::after_millis(1_000).await;
            }
        }
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static, WifiApDevice>>) -> ! {
    runner.run().await
}
