use fruit_core::models::ModelChoice;
use std::path::PathBuf;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Signup {
        email: String,
        password: String,
        confirm: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Start,
    Open(PathBuf),
    Model(ModelChoice),
    Predict,
    Wait,
    Cancel,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  go <path>                         navigate to /, /signup or /login
  signup <email> <password> <again> create an account
  login <email> <password>          sign in
  logout                            sign out
  start                             open the prediction panel
  open <file>                       choose an image
  model <MobileNetV2|InceptionResNetV2>
  predict                           send the image for classification
  wait                              wait for the running prediction
  cancel                            close the prediction panel
  show                              print the panel
  quit";

impl Command {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let cmd = match (head, args.as_slice()) {
            ("go", [path]) => Command::Go(path.to_string()),
            ("signup", [email, password, confirm]) => Command::Signup {
                email: email.to_string(),
                password: password.to_string(),
                confirm: confirm.to_string(),
            },
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("logout", []) => Command::Logout,
            ("start", []) => Command::Start,
            // File names may contain spaces.
            ("open", [_, ..]) => Command::Open(PathBuf::from(args.join(" "))),
            ("model", [name]) => Command::Model(name.parse().map_err(|e| format!("{e}"))?),
            ("predict", []) => Command::Predict,
            ("wait", []) => Command::Wait,
            ("cancel", []) => Command::Cancel,
            ("show", []) => Command::Show,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(format!("unrecognised command: {}", line.trim())),
        };
        Ok(Some(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(
            Command::parse("login a@b.c pw"),
            Ok(Some(Command::Login {
                email: "a@b.c".into(),
                password: "pw".into()
            }))
        );
        assert_eq!(
            Command::parse("model InceptionResNetV2"),
            Ok(Some(Command::Model(ModelChoice::InceptionResNetV2)))
        );
        assert_eq!(
            Command::parse("open my fruit.jpg"),
            Ok(Some(Command::Open(PathBuf::from("my fruit.jpg"))))
        );
    }

    #[test]
    fn rejects_bad_arity_and_models() {
        assert!(Command::parse("login only-email").is_err());
        assert_eq!(
            Command::parse("model ResNet50"),
            Err("unknown model: ResNet50".to_string())
        );
        assert!(Command::parse("predict now").is_err());
    }
}
