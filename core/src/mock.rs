//! A scripted subsystem that records every call made through it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::subsystem::{
    Card, Context, Protocol, Protocols, Release, ResponseBuffer, Scope, SendPci, Subsystem,
    RESPONSE_CAPACITY,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Establish(Scope),
    ListReaders,
    Connect(String, Protocols),
    ActiveProtocol,
    Transmit(SendPci, Vec<u8>),
    Disconnect,
    Release,
}

#[derive(Clone)]
pub struct MockSubsystem {
    readers: Vec<String>,
    protocol: Option<Protocol>,
    response: ResponseBuffer,
    establish_error: Option<Error>,
    connect_error: Option<Error>,
    protocol_error: Option<Error>,
    transmit_error: Option<(usize, Error)>,
    disconnect_error: Option<Error>,
    release_error: Option<Error>,
    events: Rc<RefCell<Vec<Event>>>,
    transmits: Rc<Cell<usize>>,
}

impl MockSubsystem {
    /// One reader named `MockReader`, negotiating T1 and answering `90 00` to everything.
    pub fn new() -> Self {
        let mut response = [0u8; RESPONSE_CAPACITY];
        response[0] = 0x90;

        Self {
            readers: vec!["MockReader".to_owned()],
            protocol: Some(Protocol::T1),
            response,
            establish_error: None,
            connect_error: None,
            protocol_error: None,
            transmit_error: None,
            disconnect_error: None,
            release_error: None,
            events: Default::default(),
            transmits: Default::default(),
        }
    }

    pub fn readers(mut self, readers: &[&str]) -> Self {
        self.readers = readers.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn protocol(mut self, protocol: Option<Protocol>) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn response(mut self, response: &[u8]) -> Self {
        self.response = [0u8; RESPONSE_CAPACITY];
        self.response[..response.len()].copy_from_slice(response);
        self
    }

    pub fn fail_establish(mut self, error: Error) -> Self {
        self.establish_error = Some(error);
        self
    }

    pub fn fail_connect(mut self, error: Error) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn fail_active_protocol(mut self, error: Error) -> Self {
        self.protocol_error = Some(error);
        self
    }

    /// Fails the `n`th transmission, counting from 1.
    pub fn fail_transmit(mut self, n: usize, error: Error) -> Self {
        self.transmit_error = Some((n, error));
        self
    }

    pub fn fail_disconnect(mut self, error: Error) -> Self {
        self.disconnect_error = Some(error);
        self
    }

    pub fn fail_release(mut self, error: Error) -> Self {
        self.release_error = Some(error);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn outcome(error: &Option<Error>) -> Result<()> {
        match error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Subsystem for MockSubsystem {
    type Context = MockContext;

    fn establish(&self, scope: Scope) -> Result<MockContext> {
        self.record(Event::Establish(scope));

        Self::outcome(&self.establish_error).map(|_| MockContext(self.clone()))
    }
}

pub struct MockContext(MockSubsystem);

impl Release for MockContext {
    fn release(self) -> Result<()> {
        self.0.record(Event::Release);
        MockSubsystem::outcome(&self.0.release_error)
    }
}

impl Context for MockContext {
    type Card = MockCard;
    type Reader = String;

    fn list_readers(&self) -> Result<Vec<String>> {
        self.0.record(Event::ListReaders);
        Ok(self.0.readers.clone())
    }

    fn connect(&self, reader: &String, protocols: Protocols) -> Result<MockCard> {
        self.0.record(Event::Connect(reader.clone(), protocols));

        MockSubsystem::outcome(&self.0.connect_error).map(|_| MockCard(self.0.clone()))
    }
}

pub struct MockCard(MockSubsystem);

impl Release for MockCard {
    fn release(self) -> Result<()> {
        self.0.record(Event::Disconnect);
        MockSubsystem::outcome(&self.0.disconnect_error)
    }
}

impl Card for MockCard {
    fn active_protocol(&self) -> Result<Option<Protocol>> {
        self.0.record(Event::ActiveProtocol);

        MockSubsystem::outcome(&self.0.protocol_error).map(|_| self.0.protocol)
    }

    fn transmit(&self, pci: SendPci, tx: &[u8], rx: &mut ResponseBuffer) -> Result<usize> {
        self.0.record(Event::Transmit(pci, tx.to_vec()));

        let n = self.0.transmits.get() + 1;
        self.0.transmits.set(n);

        match &self.0.transmit_error {
            Some((at, e)) if *at == n => Err(e.clone()),
            _ => {
                rx.copy_from_slice(&self.0.response);
                Ok(RESPONSE_CAPACITY)
            }
        }
    }
}
