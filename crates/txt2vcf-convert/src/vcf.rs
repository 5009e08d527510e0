use txt2vcf_core::ContactRecord;

pub const VCF_EXTENSION: &str = "vcf";

/// Renders records as `BEGIN:VCARD` / `FN` / `TEL` / `END:VCARD` cards joined
/// by a single newline. No records means an empty body.
pub fn serialize_cards(records: &[ContactRecord]) -> String {
    records
        .iter()
        .map(serialize_card)
        .collect::<Vec<_>>()
        .join("\n")
}

fn serialize_card(record: &ContactRecord) -> String {
    let mut out = String::new();
    out.push_str("BEGIN:VCARD\r\n");
    out.push_str(&format!(
        "FN:{}\r\n",
        escape_vcard_value(record.display_name())
    ));
    out.push_str(&format!("TEL:{}\r\n", escape_vcard_value(record.phone())));
    out.push_str("END:VCARD\r\n");
    out
}

/// Escapes a property value. Any line break (`\r\n`, `\r` or `\n`) becomes a
/// single `\n` escape so a value can never split a card line.
fn escape_vcard_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            ';' | ',' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
