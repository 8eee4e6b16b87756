use palaver_core::{UserId, implement, matrix::IndexedEvent};
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// Park a waiter for this user. The returned channel terminates exactly
/// once: with the next delivered event, or empty upon cancellation.
#[implement(super::Service)]
pub fn listen(
	&self,
	user_id: &UserId,
	cancel: oneshot::Receiver<()>,
) -> mpsc::Receiver<IndexedEvent> {
	let (sender, receiver) = mpsc::channel(1);
	self.watchers
		.lock()
		.expect("locked")
		.entry(user_id.clone())
		.or_default()
		.push(sender.clone());

	trace!(%user_id, "parked waiter");

	// The background waiter disarms the channel on cancellation; dropping
	// the last sender closes it towards the reader.
	let services = self.services.clone();
	let user_id = user_id.clone();
	tokio::spawn(async move {
		let _ = cancel.await;
		services.sync.disarm(&user_id, &sender);
	});

	receiver
}

/// Deliver an event to every waiter of each recipient and clear their
/// lists. The channels are buffered with capacity one, so delivery never
/// blocks the sender; a waiter that was cancelled in the meantime is
/// simply gone.
#[implement(super::Service)]
pub fn send<'a, I>(&self, recipients: I, event: &IndexedEvent)
where
	I: IntoIterator<Item = &'a UserId>,
{
	let mut watchers = self.watchers.lock().expect("locked");
	for user_id in recipients {
		let Some(waiters) = watchers.remove(user_id) else {
			continue;
		};

		trace!(%user_id, count = waiters.len(), "waking waiters");
		for waiter in waiters {
			waiter.try_send(event.clone()).ok();
		}
	}
}

#[implement(super::Service)]
fn disarm(&self, user_id: &UserId, sender: &mpsc::Sender<IndexedEvent>) {
	let mut watchers = self.watchers.lock().expect("locked");
	if let Some(waiters) = watchers.get_mut(user_id) {
		waiters.retain(|waiter| !waiter.same_channel(sender));
		if waiters.is_empty() {
			watchers.remove(user_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use palaver_core::{
		Config, Server,
		matrix::{
			RoomId, Timestamp, TypingEvent, UserId,
			event::{IndexedEvent, TypingContent},
		},
	};
	use tokio::sync::oneshot;

	use crate::Services;

	fn services() -> Arc<Services> {
		let server = Arc::new(Server::new(Config::default(), None));
		Services::build(server).expect("services built")
	}

	fn typing_event(index: u64) -> IndexedEvent {
		IndexedEvent {
			event: TypingEvent {
				room_id: RoomId::new("room", "test"),
				content: TypingContent::default(),
			}
			.into(),
			index,
		}
	}

	#[tokio::test]
	async fn waiter_receives_one_event_then_closes() {
		let services = services();
		let alice = UserId::new("alice", "test");
		let (_cancel_tx, cancel_rx) = oneshot::channel();

		let mut receiver = services.sync.listen(&alice, cancel_rx);
		services
			.sync
			.send([&alice], &typing_event(7));

		let received = receiver.recv().await.expect("event delivered");
		assert_eq!(received.index, 7);
		assert!(receiver.recv().await.is_none());
	}

	#[tokio::test]
	async fn cancellation_closes_the_channel_empty() {
		let services = services();
		let alice = UserId::new("alice", "test");
		let (cancel_tx, cancel_rx) = oneshot::channel();

		let mut receiver = services.sync.listen(&alice, cancel_rx);
		cancel_tx.send(()).ok();

		assert!(receiver.recv().await.is_none());

		// a later send finds no waiter and must not block
		services
			.sync
			.send([&alice], &typing_event(1));
	}

	#[tokio::test]
	async fn all_waiters_of_a_recipient_wake() {
		let services = services();
		let alice = UserId::new("alice", "test");
		let bob = UserId::new("bob", "test");
		let (_tx1, rx1) = oneshot::channel();
		let (_tx2, rx2) = oneshot::channel();
		let (tx3, rx3) = oneshot::channel();

		let mut first = services.sync.listen(&alice, rx1);
		let mut second = services.sync.listen(&alice, rx2);
		let mut other = services.sync.listen(&bob, rx3);

		services
			.sync
			.send([&alice], &typing_event(3));

		assert_eq!(first.recv().await.expect("delivered").index, 3);
		assert_eq!(second.recv().await.expect("delivered").index, 3);

		// bob was not a recipient; his waiter only ends by cancellation
		tx3.send(()).ok();
		assert!(other.recv().await.is_none());
	}
}
