//! Session fixtures shared by the store unit tests.

use tokio::sync::watch;

use super::{
    AuthToken, Identity, ResourceId, Room, SessionPhase, SessionSnapshot, SessionWatch,
};

/// Publisher half of a session channel, driven directly by tests.
pub(crate) struct SessionDriver {
    sender: watch::Sender<SessionSnapshot>,
}

impl SessionDriver {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(SessionSnapshot::restoring());
        Self { sender }
    }

    pub(crate) fn watch(&self) -> SessionWatch {
        SessionWatch::new(self.sender.subscribe())
    }

    pub(crate) fn login(&self, username: &str) -> SessionSnapshot {
        let identity = Identity::new(username, AuthToken::new(format!("{username}-token")));
        self.advance(SessionPhase::Authenticated(identity))
    }

    pub(crate) fn logout(&self) -> SessionSnapshot {
        self.advance(SessionPhase::Anonymous)
    }

    fn advance(&self, phase: SessionPhase) -> SessionSnapshot {
        self.sender.send_modify(|snapshot| snapshot.advance(phase));
        self.sender.borrow().clone()
    }
}

pub(crate) fn room(id: i64, name: &str) -> Room {
    Room {
        id: ResourceId::Number(id),
        name: name.to_owned(),
        function: "Bedroom".to_owned(),
        floor: "1".to_owned(),
        area: None,
    }
}
