use croak_msg::Code;

/// Request method
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Method(pub(crate) Code);

impl Method {
  /// 0.00, the EMPTY method (CoAP ping)
  pub const EMPTY: Method = Method(Code::new(0, 0));
  /// 0.01 GET
  pub const GET: Method = Method(Code::new(0, 1));
  /// 0.02 POST
  pub const POST: Method = Method(Code::new(0, 2));
  /// 0.03 PUT
  pub const PUT: Method = Method(Code::new(0, 3));
  /// 0.04 DELETE
  pub const DELETE: Method = Method(Code::new(0, 4));

  /// The message code this method goes on the wire as
  pub fn code(&self) -> Code {
    self.0
  }
}

impl core::fmt::Display for Method {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self.0 {
      | Code { class: 0,
               detail: 0, } => write!(f, "EMPTY"),
      | Code { class: 0,
               detail: 1, } => write!(f, "GET"),
      | Code { class: 0,
               detail: 2, } => write!(f, "POST"),
      | Code { class: 0,
               detail: 3, } => write!(f, "PUT"),
      | Code { class: 0,
               detail: 4, } => write!(f, "DELETE"),
      | c => write!(f, "{}", c),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::PUT.to_string(), "PUT");
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method::EMPTY.to_string(), "EMPTY");
  }

  #[test]
  fn codes() {
    assert_eq!(Method::GET.code(), Code::new(0, 1));
    assert_eq!(Method::DELETE.code(), Code::new(0, 4));
  }
}
