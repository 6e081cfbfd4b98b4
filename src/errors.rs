use std::time::Duration;

error_chain! {
    errors {
        Timeout(waited: Duration) {
            description("no matching tuple before the deadline")
            display("no matching tuple after waiting {:?}", waited)
        }
        UnexpectedCharacter(found: char, offset: usize) {
            description("unexpected character")
            display("unexpected character '{}' at offset {}", found, offset)
        }
        UnexpectedEnd(offset: usize) {
            description("unexpected end of input")
            display("unexpected end of input at offset {}", offset)
        }
        UnterminatedString(offset: usize) {
            description("unterminated string literal")
            display("unterminated string literal starting at offset {}", offset)
        }
        InvalidNumber(text: String, offset: usize) {
            description("malformed number")
            display("malformed number '{}' at offset {}", text, offset)
        }
        UnknownKind(name: String, offset: usize) {
            description("unknown wildcard kind")
            display("unknown wildcard kind '?{}' at offset {}", name, offset)
        }
        WildcardInTuple(offset: usize) {
            description("wildcard in a tuple")
            display("wildcard at offset {} is only allowed in a pattern", offset)
        }
        TrailingInput(offset: usize) {
            description("trailing input")
            display("unexpected trailing input at offset {}", offset)
        }
    }
}
