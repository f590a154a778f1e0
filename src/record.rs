use crate::error::{KeyTallyError, KtResult};

pub const FIELD_COUNT: usize = 9;

pub const EXPECTED_HEADER_LINE: &str = "PARTICIPANT_ID\tTEST_SECTION_ID\tSENTENCE\tUSER_INPUT\tKEYSTROKE_ID\tPRESS_TIME\tRELEASE_TIME\tLETTER\tKEYCODE";

/// Key name substituted when the pressed key was a literal line feed.
pub const KEY_NAME_LITERAL_LF: &str = "LITERAL_LF";
/// Key name substituted when the pressed key was a literal tab.
pub const KEY_NAME_LITERAL_TAB: &str = "LITERAL_TAB";

/// One reconstructed keystroke event.
///
/// `key_name` and `key_code` never contain `\t` or `\n`; construction goes
/// through [`KeystrokeRecord::try_from_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeRecord {
    participant_id: String,
    test_section_id: String,
    sentence: String,
    user_input: String,
    keystroke_id: String,
    press_time: String,
    release_time: String,
    key_name: String,
    key_code: String,
}

impl KeystrokeRecord {
    /// Builds a record from fields in file order, rejecting a key name or key
    /// code that contains `\t` or `\n`.
    pub fn try_from_fields(fields: [String; FIELD_COUNT]) -> KtResult<Self> {
        let forbidden = |s: &str| s.contains('\n') || s.contains('\t');
        if forbidden(&fields[FIELD_COUNT - 2]) {
            return Err(KeyTallyError::Format(format!(
                "\\n or \\t in keyname: {:?}",
                fields
            )));
        }
        if forbidden(&fields[FIELD_COUNT - 1]) {
            return Err(KeyTallyError::Format(format!(
                "\\n or \\t in keycode: {:?}",
                fields
            )));
        }
        Ok(Self::from_array(fields))
    }

    fn from_array(fields: [String; FIELD_COUNT]) -> Self {
        let [participant_id, test_section_id, sentence, user_input, keystroke_id, press_time, release_time, key_name, key_code] =
            fields;
        Self {
            participant_id,
            test_section_id,
            sentence,
            user_input,
            keystroke_id,
            press_time,
            release_time,
            key_name,
            key_code,
        }
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn test_section_id(&self) -> &str {
        &self.test_section_id
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn keystroke_id(&self) -> &str {
        &self.keystroke_id
    }

    pub fn press_time(&self) -> &str {
        &self.press_time
    }

    pub fn release_time(&self) -> &str {
        &self.release_time
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn key_code(&self) -> &str {
        &self.key_code
    }

    /// Fields in file order.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.participant_id,
            &self.test_section_id,
            &self.sentence,
            &self.user_input,
            &self.keystroke_id,
            &self.press_time,
            &self.release_time,
            &self.key_name,
            &self.key_code,
        ]
    }
}
