// Line-reader REPL against the simulated register file.
// Each line typed on stdin is fed to USART0 byte for byte and read back
// through the driver, so backspace editing and overflow behave as on the board.

use std::io::BufRead;

use uartline::sim::SimBus;
use uartline::{FrameConfig, Uarts, LINE_CAPACITY};

fn main() {
    let uarts = Uarts::new(SimBus::new());
    if let Err(e) = uarts.initialize(0, &FrameConfig::BAUD_9600_8N1) {
        eprintln!("init failed: {}", e);
        return;
    }

    println!("Simulated USART0 REPL - lines longer than {} bytes are cut", LINE_CAPACITY - 1);
    println!("Type 'exit' to quit");

    let stdin = std::io::stdin();
    for input in stdin.lock().lines() {
        let input = match input {
            Ok(input) => input,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };

        uarts.bus().feed(0, input.as_bytes());
        uarts.bus().feed(0, b"\r");

        let mut buf = [0u8; LINE_CAPACITY];
        match uarts.read_line(0, &mut buf) {
            Ok(line) => {
                let text = line.as_str().unwrap_or("<binary>");
                if text == "exit" {
                    println!("Goodbye!");
                    break;
                }
                println!("typed: {}", text);
                if line.truncated() {
                    println!("({} bytes dropped)", line.discarded());
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        uarts.bus().take_transmitted(0);
    }
}
