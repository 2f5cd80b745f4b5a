use conquer_once::spin::Lazy;
use spin::Mutex;
use uart_16550::SerialPort;

/// I/O port of the first serial interface.
const COM1: u16 = 0x3F8;

/// Serial port used for log output in QEMU.
pub static SERIAL: Lazy<Mutex<SerialPort>> = Lazy::new(|| {
    let mut port = unsafe { SerialPort::new(COM1) };
    port.init();
    Mutex::new(port)
});

/// Global print! macro that writes to the serial interface in QEMU.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {{
        // Use absolute paths to prevent conflicts
        let _ = ::core::fmt::Write::write_fmt(
            &mut *$crate::serial::SERIAL.lock(),
            format_args!($($arg)*)
        );
    }};
}

/// Global println! macro that writes to the serial interface in QEMU.
#[macro_export]
macro_rules! serial_println {
    () => {
        $crate::serial_print!("\n");
    };
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*));
    };
}
