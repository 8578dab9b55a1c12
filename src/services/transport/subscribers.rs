//! Subscriber registry.

use std::{fmt, sync::Arc};

use crate::models::Message;

/// Callback invoked for every delivered message
pub type MessageHandler = Arc<dyn Fn(&Message) + Send + Sync>;

#[derive(Clone)]
struct Subscription {
	/// Only messages admitted by this filter are delivered; `None` receives everything
	filter_name: Option<String>,
	handler: MessageHandler,
}

/// Ordered set of subscriber callbacks.
///
/// Delivery follows registration order for each message.
#[derive(Clone, Default)]
pub struct Subscribers {
	subscriptions: Vec<Subscription>,
}

impl Subscribers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a handler for every message
	pub fn subscribe<F>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(&Message) + Send + Sync + 'static,
	{
		self.subscriptions.push(Subscription {
			filter_name: None,
			handler: Arc::new(handler),
		});
		self
	}

	/// Registers a handler for messages admitted by the named filter
	pub fn subscribe_filter<F>(&mut self, filter_name: impl Into<String>, handler: F) -> &mut Self
	where
		F: Fn(&Message) + Send + Sync + 'static,
	{
		self.subscriptions.push(Subscription {
			filter_name: Some(filter_name.into()),
			handler: Arc::new(handler),
		});
		self
	}

	pub fn len(&self) -> usize {
		self.subscriptions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.subscriptions.is_empty()
	}

	/// Hands the message to every interested subscriber; returns the number of deliveries
	pub fn dispatch(&self, message: &Message) -> usize {
		let mut delivered = 0;
		for subscription in &self.subscriptions {
			let interested = subscription
				.filter_name
				.as_deref()
				.map(|name| name == message.filter_name)
				.unwrap_or(true);
			if interested {
				(subscription.handler)(message);
				delivered += 1;
			}
		}
		delivered
	}
}

impl fmt::Debug for Subscribers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscribers")
			.field(
				"subscriptions",
				&self
					.subscriptions
					.iter()
					.map(|s| s.filter_name.as_deref().unwrap_or("*"))
					.collect::<Vec<_>>(),
			)
			.finish()
	}
}
