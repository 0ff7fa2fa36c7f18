use std::pin::Pin;

use derivative::Derivative;
use futures::channel::oneshot;
use futures::future::Either;
use futures::prelude::*;

use crate::configuration::ListenAddr;
use crate::error::ContactsError;

pub(crate) type ServerFuture = Pin<Box<dyn Future<Output = Result<(), ContactsError>> + Send>>;

/// A handle with which a client can shut down the server gracefully.
/// This relies on the underlying server implementation doing the right thing.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct HttpServerHandle {
    /// Sender to use to notify of shutdown
    shutdown_sender: oneshot::Sender<()>,

    /// Future to wait on for graceful shutdown
    #[derivative(Debug = "ignore")]
    server_future: ServerFuture,

    /// The listen address that the server is actually listening on.
    /// If the socket address specified port zero the OS will assign a random free port.
    listen_address: ListenAddr,
}

impl HttpServerHandle {
    pub(crate) fn new(
        shutdown_sender: oneshot::Sender<()>,
        server_future: ServerFuture,
        listen_address: ListenAddr,
    ) -> Self {
        Self {
            shutdown_sender,
            server_future,
            listen_address,
        }
    }

    pub async fn shutdown(self) -> Result<(), ContactsError> {
        if let Err(_err) = self.shutdown_sender.send(()) {
            tracing::error!("Failed to notify http thread of shutdown")
        };
        self.server_future.await
    }

    /// Serves until `signal` resolves, then shuts down gracefully.
    ///
    /// Returns early if the server stops on its own.
    pub async fn serve_until<S>(self, signal: S) -> Result<(), ContactsError>
    where
        S: Future<Output = ()> + Send,
    {
        let Self {
            shutdown_sender,
            server_future,
            ..
        } = self;

        match future::select(server_future, Box::pin(signal)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), server_future)) => {
                tracing::info!("shutting down");
                if let Err(_err) = shutdown_sender.send(()) {
                    tracing::error!("Failed to notify http thread of shutdown")
                };
                server_future.await
            }
        }
    }

    pub fn listen_address(&self) -> &ListenAddr {
        &self.listen_address
    }
}
