/// Errors encounterable while parsing a message from bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// The version bits were not 1
  InvalidVersion(u8),

  /// Token length was > 8
  InvalidTokenLength(u8),

  /// The message type bits are invalid (see [`crate::Type`])
  InvalidType(u8),

  /// Error parsing option
  OptParseError(OptParseError),

  /// The payload marker (0xFF) was present but not followed by any
  /// payload bytes
  PayloadMarkerNoPayload,
}

impl MessageParseError {
  /// Shorthand for [`MessageParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}

/// Errors encounterable while parsing an option from bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptParseError {
  /// Reached end of stream before parsing was finished
  UnexpectedEndOfStream,

  /// Option Delta nibble was set to 15, which is reserved
  OptionDeltaReservedValue(u8),

  /// Value Length nibble was set to 15, which is reserved
  ValueLengthReservedValue(u8),
}

impl OptParseError {
  /// Shorthand for [`OptParseError::UnexpectedEndOfStream`]
  pub fn eof() -> Self {
    Self::UnexpectedEndOfStream
  }
}
