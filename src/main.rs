#![deny(unsafe_code)]
#![no_main]
#![no_std]

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_net::udp::PacketMetadata;
use embassy_time::{Delay, Timer};
use esp_hal::{rng::Rng, timer::timg::TimerGroup, usb_serial_jtag::UsbSerialJtag};
use esp_wifi::{init, EspWifiController};

use defmt::{error, info};
use esp_alloc as _;
use esp_backtrace as _;
use esp_println as _;

use bno055_udp::{
    config::CONFIG, i2c, imu::Bno055Sensor, net::UdpBroadcaster, pins, serial::SerialSink,
    storage::At24c256, wifi, Station,
};

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) -> ! {
    info!("Initializing");

    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(72 * 1024);

    let config = &CONFIG;
    if let Err(e) = config.validate() {
        loop {
            error!("Invalid configuration: {}", e);
            Timer::after_millis(1_000).await;
        }
    }

    let pins = pins::get_pins_mini_c3(peripherals);

    let timg0 = TimerGroup::new(pins.timg0);
    let timg1 = TimerGroup::new(pins.timg1);
    esp_hal_embassy::init(timg1.timer0);

    // IMU and EEPROM share the bus
    let i2c_bus = i2c::init(pins.i2c, pins.i2c_sda, pins.i2c_scl, config.i2c_frequency);
    let sensor = Bno055Sensor::new(I2cDevice::new(i2c_bus), config);
    let eeprom = At24c256::new(
        I2cDevice::new(i2c_bus),
        Delay,
        config.eeprom_address,
        config.calib_eeprom_offset,
    );

    let mut station = Station::new(config, sensor, eeprom, Delay);
    station.bring_up().await;

    let mut rng = Rng::new(pins.rng);
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let wifi_init = &*mk_static!(
        EspWifiController<'static>,
        match init(timg0.timer0, rng, pins.radio_clk) {
            Ok(controller) => controller,
            Err(_) => defmt::panic!("WiFi driver failed to initialize"),
        }
    );

    let stack = match wifi::start_access_point(spawner, wifi_init, pins.wifi, config, seed).await {
        Ok(stack) => stack,
        Err(e) => defmt::panic!("Access point failed: {}", e),
    };

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 256];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 1024];

    let mut udp = match UdpBroadcaster::new(
        stack,
        config.udp_port,
        config.broadcast_ip(),
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    ) {
        Ok(udp) => udp,
        Err(e) => defmt::panic!("UDP socket unavailable: {}", e),
    };

    let mut serial = SerialSink::new(UsbSerialJtag::new(pins.usb).into_async());

    info!("Initializing complete");

    station.run(&mut udp, Some(&mut serial)).await
}
