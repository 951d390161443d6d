//! Hardware bring-up and the command context of the console
//!
//! `Device` owns the peripherals the commands need: the status led, the VSYS adc channel and
//! the voltage calibration. Replies are written to the usb serial through `fmt::Write`.

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Device
// ————————————————————————————————————————————————————————————————————————————————————————————————

use core::fmt;

use pico_remote_console::Calibration;
use pico_remote_console::console::{CommandContext, CommandTable, VoltageProbe};
use pico_remote_console::log::{LogConfig, Report};

use crate::cli_commands::COMMANDS;
use crate::serial_io::{self, LOGGER, SERIAL};

use rp2040_hal as hal;
//
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;
use embedded_hal_0_2::adc::OneShot;
use hal::adc::AdcPin;
use hal::pac::interrupt;
use hal::timer::Timer;
use hal::{Adc, clocks, gpio, pac, sio, usb, watchdog};

use usb_device::class_prelude::*;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Bootloader
// —————————————————————————————————————————————————————————————————————————————————————————————————

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Globals
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub const XOSC_CRYSTAL_FREQ: u32 = 12_000_000; // 12Mhz

// GPIO 29 - internal - ADC (ADC3) for measuring VSYS
// GPIO 25 - internal - LED
pub type VsysType =
  AdcPin<gpio::Pin<gpio::bank0::Gpio29, gpio::FunctionSio<gpio::SioInput>, gpio::PullNone>>;
pub type OutputType = gpio::Pin<gpio::DynPinId, gpio::FunctionSio<gpio::SioOutput>, gpio::PullDown>;

// ———————————————————————————————————————————————————————————————————————————————————————————————
//                                             Device
// ———————————————————————————————————————————————————————————————————————————————————————————————

pub struct Device {
  pub timer:       Timer,
  pub led:         OutputType,
  pub adc:         Adc,
  pub vsys:        VsysType,
  pub calibration: Calibration,
}

impl Device {
  pub fn new() -> Self {
    // ———————————————————————————————————— Hal Boilerplate ———————————————————————————————————————

    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = watchdog::Watchdog::new(pac.WATCHDOG);
    let sio = sio::Sio::new(pac.SIO);
    let pins = gpio::Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);

    // ————————————————————————————————————————— Clocks ———————————————————————————————————————————

    let sys_clocks = clocks::init_clocks_and_plls(
      XOSC_CRYSTAL_FREQ,
      pac.XOSC,
      pac.CLOCKS,
      pac.PLL_SYS,
      pac.PLL_USB,
      &mut pac.RESETS,
      &mut watchdog,
    )
    .ok()
    .unwrap();

    // ————————————————————————————————————————— Timer ————————————————————————————————————————————

    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &sys_clocks);

    // ———————————————————————————————————————— USB Bus ———————————————————————————————————————————

    // UsbBus used for the creation of the Serial and UsbDevice
    let usb_bus_alloc = UsbBusAllocator::new(usb::UsbBus::new(
      pac.USBCTRL_REGS,
      pac.USBCTRL_DPRAM,
      sys_clocks.usb_clock,
      true,
      &mut pac.RESETS,
    ));

    // Storing UsbBus into a singleton and getting a mutable reference
    let usb_bus = cortex_m::singleton!(: UsbBusAllocator<usb::UsbBus> = usb_bus_alloc).unwrap();
    timer.delay_us(200); // Small pause for initialisation

    // ————————————————————————————————————— Serial Port ————————————————————————————————————————

    // SerialPort has to be created before UsbDev and requires a reference to UsbBus
    let serial_port = SerialPort::new(usb_bus);

    // ——————————————————————————————————————— Usb Device —————————————————————————————————————————

    let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
      .strings(&[StringDescriptors::default()
        .manufacturer("LH Eng")
        .product("Rpi Pico - Remote Console")
        .serial_number("0000")])
      .unwrap()
      .device_class(usbd_serial::USB_CLASS_CDC)
      .build();

    // ————————————————————————————————————————— SERIAL ————————————————————————————————————————————

    serial_io::init(serial_port, usb_dev);

    // —————————————————————————————————————————— ADC —————————————————————————————————————————————

    let adc = Adc::new(pac.ADC, &mut pac.RESETS); // Needs to be set after clocks
    let vsys = AdcPin::new(pins.gpio29.into_floating_input()).unwrap();

    // —————————————————————————————————————————— Pins ————————————————————————————————————————————

    let led: OutputType = pins.gpio25.into_push_pull_output().into_dyn_pin();

    // ————————————————————————————————————— Interrupts ————————————————————————————————————————

    // Enabling the USB IRQ, it feeds the console receiver
    unsafe {
      pac::NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
    };

    // —————————————————————————————————————— Construct ———————————————————————————————————————————

    Self {
      timer,
      led,
      adc,
      vsys,
      calibration: Calibration::DEFAULT,
    }
  }

  pub fn toggle_led(&mut self) {
    let _ = self.led.toggle();
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                        Command Context
// ————————————————————————————————————————————————————————————————————————————————————————————————

// ——————————————————————————————————————————— Write ——————————————————————————————————————————————

/// Command replies go to the usb serial
impl fmt::Write for Device {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    SERIAL.write(s.as_bytes()).map_err(|_| fmt::Error)
  }
}

impl CommandContext for Device {
  fn commands(&self) -> &'static CommandTable<Self> {
    &COMMANDS
  }

  fn log(&self) -> &dyn Report {
    &LOGGER
  }

  fn log_config(&self) -> &LogConfig {
    LOGGER.config()
  }
}

impl VoltageProbe for Device {
  fn read_counts(&mut self) -> u16 {
    let counts: Option<u16> = self.adc.read(&mut self.vsys).ok();
    counts.unwrap_or(0)
  }

  fn calibration(&self) -> Calibration {
    self.calibration
  }

  fn calibration_mut(&mut self) -> &mut Calibration {
    &mut self.calibration
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                          Free Functions
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// Reset to USB Flash mode
pub fn device_reset_to_usb() -> ! {
  hal::rom_data::reset_to_usb_boot(0, 0);
  loop {
    cortex_m::asm::nop();
  }
}

/// Reset device
pub fn device_reset() -> ! {
  cortex_m::peripheral::SCB::sys_reset();
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Interrupts
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// USB Interrupt
/// Keeps the connection alive and moves received bytes into the console.
/// The rx endpoint must be drained here, otherwise the interrupt keeps firing.
#[pac::interrupt]
fn USBCTRL_IRQ() {
  serial_io::feed_receiver();
}
