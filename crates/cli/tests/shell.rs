use cli::shell::Shell;
use fruit_core::app::Providers;
use fruit_core::workflow::Phase;
use providers::{
    AuthProvider, ClassificationService, Identity, IdentityFeed, PredictRequest, PredictResponse,
    ProviderError, Unsubscribe,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct OneUserAuth {
    feed: IdentityFeed,
}

#[async_trait::async_trait]
impl AuthProvider for OneUserAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        if email != "a@b.c" || password != "secret1" {
            return Err(ProviderError::Rejected("bad".into()));
        }
        let identity = Identity::new("uid-a", Some(email.to_string()));
        self.feed.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Identity, ProviderError> {
        Err(ProviderError::Rejected(
            "Firebase: Error (auth/email-already-in-use).".into(),
        ))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.feed.publish(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.feed.current()
    }

    fn subscribe(&self, on_change: Box<dyn Fn(Option<Identity>) + Send + Sync>) -> Unsubscribe {
        self.feed.subscribe(on_change)
    }

    async fn get_token(&self, identity: &Identity) -> Result<String, ProviderError> {
        Ok(format!("tok-{}", identity.uid()))
    }
}

#[derive(Default)]
struct BananaService {
    models: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ClassificationService for BananaService {
    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, ProviderError> {
        self.models.lock().unwrap().push(req.model_type);
        Ok(PredictResponse {
            prediction: 4,
            confidence: 0.87,
        })
    }
}

async fn run_script(script: &str) -> (Shell, String, Arc<BananaService>) {
    let service = Arc::new(BananaService::default());
    let providers = Providers {
        auth: Arc::new(OneUserAuth::default()),
        service: service.clone(),
    };
    let mut shell = Shell::new(providers);
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).await.unwrap();
    (shell, String::from_utf8(out).unwrap(), service)
}

#[tokio::test]
async fn scripted_session_predicts_and_signs_out() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("banana.jpg");
    std::fs::write(&image, b"\xFF\xD8\xFF\xE0banana").unwrap();

    let script = format!(
        "go /login\nstart\nlogin a@b.c secret1\ngo /signup\nstart\nopen {}\nmodel InceptionResNetV2\npredict\npredict\nwait\nlogout\nshow\nquit\n",
        image.display()
    );
    let (shell, out, service) = run_script(&script).await;

    assert!(out.contains("page: /login"), "{out}");
    assert!(out.contains("signed in as a@b.c"), "{out}");
    assert!(out.contains("redirect: /"), "{out}");
    assert!(out.contains("[NoFile] model=MobileNetV2 file=UPLOAD FRUIT IMAGE"), "{out}");
    assert!(out.contains("[FileSelected] model=MobileNetV2 file=banana.jpg"), "{out}");
    assert!(out.contains("a prediction is already in flight"), "{out}");
    assert!(out.contains("Quality: Banana (Good)"), "{out}");
    assert!(out.contains("Confidence: 87.00%"), "{out}");
    assert!(out.contains("signed out"), "{out}");
    assert!(out.trim_end().ends_with("[Idle] model=MobileNetV2 file=UPLOAD FRUIT IMAGE"), "{out}");

    assert_eq!(*service.models.lock().unwrap(), vec!["inception".to_string()]);
    assert_eq!(shell.workflow().phase(), Phase::Idle);
    assert!(!shell.gate().can_enter_workflow());
}

#[tokio::test]
async fn form_errors_stay_on_the_form() {
    let (shell, out, service) = run_script(
        "login a@b.c nope\nsignup a@b.c x y\nsignup a@b.c x x\npredict\n",
    )
    .await;

    assert!(out.contains("login: Invalid email or password"), "{out}");
    assert!(out.contains("signup: Passwords do not match"), "{out}");
    assert!(out.contains("signup: Error (auth/email-already-in-use)."), "{out}");
    assert!(out.trim_end().ends_with("page: /login"), "{out}");
    assert!(service.models.lock().unwrap().is_empty());
    assert_eq!(shell.workflow().phase(), Phase::Idle);
}

#[tokio::test]
async fn cancel_while_predicting_drops_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("apple.jpg");
    std::fs::write(&image, b"\xFF\xD8\xFF\xE0apple").unwrap();

    let script = format!(
        "login a@b.c secret1\nstart\nopen {}\npredict\ncancel\nwait\nshow\n",
        image.display()
    );
    let (shell, out, _) = run_script(&script).await;

    assert!(!out.contains("Quality:"), "{out}");
    assert_eq!(shell.workflow().phase(), Phase::Idle);
    assert!(shell.workflow().outcome().is_none());
}

#[tokio::test]
async fn logout_is_not_undone_by_the_queued_login_event() {
    for _ in 0..50 {
        let (shell, out, _) = run_script("login a@b.c secret1\nlogout\nstart\nquit\n").await;

        assert!(out.trim_end().ends_with("page: /login"), "{out}");
        assert!(!shell.gate().can_enter_workflow());
        assert!(!shell.workflow().is_active());
    }
}
