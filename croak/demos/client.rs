//! A minimal CoAP GET:
//!
//! ```text
//! cargo run --example client -- coap://coap.me/hello
//! ```

use croak::config::Config;
use croak::core::Core;
use croak::req::Req;
use croak::sys;

fn main() {
  simple_logger::init_with_level(log::Level::Debug).unwrap();

  let url = std::env::args().nth(1)
                            .unwrap_or_else(|| "coap://coap.me/hello".to_string());

  let sock = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
  let mut core = Core::new(Config::default(), sys::Clock::new(), sock, sys::Resolver);

  let token = core.submit(Req::get(url.parse().unwrap())).unwrap();

  match nb::block!(core.poll_reply(token)) {
    | Ok(Ok(resp)) => println!("{}: {}", resp.code(), resp.payload_string().unwrap_or_default()),
    | Ok(Err(fail)) => eprintln!("request failed: {:?}", fail),
    | Err(err) => eprintln!("core error: {:?}", err),
  }
}
