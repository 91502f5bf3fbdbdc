//! The packet facade.
//!
//! A [`Packet`] owns an opened archive and the parsed control manifest.
//! Everything else is materialised lazily: the message store on the first
//! full traversal, the optional files on first access. Anomalies from every
//! parse accumulate in one validation report, available independently of
//! whether anything was raised.

use std::io::Read;

use log::debug;
use qwk_types::{
    control::{Conference, ControlDat},
    cp437,
    door::DoorId,
    ext::ExtFile,
    index::IndexFile,
    message::Message,
    options::PacketOptions,
    report::{Anomaly, AnomalyKind, Location, ValidationReport},
};

use crate::{
    archive::Archive,
    control, door,
    error::QwkError,
    ext, index,
    store::{self, MessageStream},
    validate::ValidationContext,
};

/// An opened QWK packet.
///
/// Not safe for concurrent use; distinct packets over distinct archives
/// are independent.
#[derive(Debug)]
pub struct Packet<A> {
    archive: Option<A>,
    options: PacketOptions,
    control: ControlDat,
    ctx: ValidationContext,
    messages: Option<Vec<Message>>,
    door_id: Option<Option<DoorId>>,
    to_reader: Option<Option<ExtFile>>,
    to_door: Option<Option<ExtFile>>,
}

impl<A: Archive> Packet<A> {
    /// Opens a packet: parses the control manifest, defers the rest.
    ///
    /// Fails regardless of mode when `CONTROL.DAT` is missing; without it
    /// there is no packet to speak of.
    pub fn open(mut archive: A, options: PacketOptions) -> Result<Self, QwkError> {
        let mut ctx = ValidationContext::new(options.validation_mode);

        let bytes = fetch_entry(&mut archive, &mut ctx, &options, control::FILE_NAME)?
            .ok_or_else(|| QwkError::EntryNotFound(control::FILE_NAME.into()))?;
        let control = control::parse(&bytes, &mut ctx)?;

        debug!(
            "opened packet from {:?} with {} conferences",
            control.bbs_id,
            control.conferences.len(),
        );

        Ok(Self {
            archive: Some(archive),
            options,
            control,
            ctx,
            messages: None,
            door_id: None,
            to_reader: None,
            to_door: None,
        })
    }

    pub fn control(&self) -> &ControlDat {
        &self.control
    }

    pub fn conferences(&self) -> &[Conference] {
        &self.control.conferences
    }

    pub fn options(&self) -> &PacketOptions {
        &self.options
    }

    /// The validation report accumulated so far.
    pub fn report(&self) -> &ValidationReport {
        self.ctx.report()
    }

    pub fn is_closed(&self) -> bool {
        self.archive.is_none()
    }

    /// All messages, in on-disk order.
    ///
    /// The store is walked once and materialised; later calls return the
    /// same slice. A raised error closes the packet.
    pub fn messages(&mut self) -> Result<&[Message], QwkError> {
        self.materialise_messages()?;

        Ok(self.messages.as_deref().expect("just materialised"))
    }

    /// Random access by on-disk position.
    pub fn message(&mut self, index: usize) -> Result<Option<&Message>, QwkError> {
        Ok(self.messages()?.get(index))
    }

    /// The messages of one conference, in on-disk order.
    pub fn messages_in_conference(
        &mut self,
        conference: u16,
    ) -> Result<Vec<&Message>, QwkError> {
        Ok(self
            .messages()?
            .iter()
            .filter(|message| message.header.conference == conference)
            .collect())
    }

    /// Streams the message store without materialising it.
    ///
    /// The stream keeps its own validation report; the packet report does
    /// not absorb it.
    pub fn stream_messages(
        &mut self,
    ) -> Result<MessageStream<Box<dyn Read + '_>>, QwkError> {
        let Some(archive) = self.archive.as_mut() else {
            return Err(QwkError::Closed);
        };

        let reader = archive.open(store::FILE_NAME)?;

        Ok(MessageStream::new(reader, &self.options))
    }

    /// The door identity, when `DOOR.ID` is present.
    pub fn door_id(&mut self) -> Result<Option<&DoorId>, QwkError> {
        if self.door_id.is_none() {
            let Some(archive) = self.archive.as_mut() else {
                return Err(QwkError::Closed);
            };

            let parsed =
                match fetch_entry(archive, &mut self.ctx, &self.options, door::FILE_NAME)? {
                    Some(bytes) => Some(door::parse(&bytes, &mut self.ctx)?),
                    None => None,
                };

            self.door_id = Some(parsed);
        }

        Ok(self.door_id.as_ref().expect("just cached").as_ref())
    }

    /// The door-to-reader command file, when present.
    pub fn to_reader(&mut self) -> Result<Option<&ExtFile>, QwkError> {
        if self.to_reader.is_none() {
            let Some(archive) = self.archive.as_mut() else {
                return Err(QwkError::Closed);
            };

            let parsed =
                fetch_entry(archive, &mut self.ctx, &self.options, ext::TOREADER_FILE)?
                    .map(|bytes| ext::parse(&bytes, ext::TOREADER_FILE));

            self.to_reader = Some(parsed);
        }

        Ok(self.to_reader.as_ref().expect("just cached").as_ref())
    }

    /// The reader-to-door command file, when present.
    pub fn to_door(&mut self) -> Result<Option<&ExtFile>, QwkError> {
        if self.to_door.is_none() {
            let Some(archive) = self.archive.as_mut() else {
                return Err(QwkError::Closed);
            };

            let parsed = fetch_entry(archive, &mut self.ctx, &self.options, ext::TODOOR_FILE)?
                .map(|bytes| ext::parse(&bytes, ext::TODOOR_FILE));

            self.to_door = Some(parsed);
        }

        Ok(self.to_door.as_ref().expect("just cached").as_ref())
    }

    /// The index for a conference, from `<N>.NDX` (zero-padded names are
    /// tried first). Entries are cross-checked against the store length.
    pub fn index(&mut self, conference: u16) -> Result<Option<IndexFile>, QwkError> {
        let padded = format!("{conference:03}.NDX");

        let name = if self
            .archive
            .as_ref()
            .map_or(false, |archive| archive.exists(&padded))
        {
            padded
        } else {
            format!("{conference}.NDX")
        };

        self.index_file(&name)
    }

    /// An index file by name, e.g. `PERSONAL.NDX`.
    pub fn index_file(&mut self, name: &str) -> Result<Option<IndexFile>, QwkError> {
        let Some(archive) = self.archive.as_mut() else {
            return Err(QwkError::Closed);
        };

        let Some(bytes) = fetch_entry(archive, &mut self.ctx, &self.options, name)? else {
            return Ok(None);
        };

        let parsed = index::parse(&bytes, name, &mut self.ctx)?;

        if let Some(store_len) = archive.entry_size(store::FILE_NAME) {
            index::cross_check(&parsed, store_len, &mut self.ctx)?;
        }

        Ok(Some(parsed))
    }

    /// The welcome screen named by the control manifest.
    pub fn welcome(&mut self) -> Result<Option<String>, QwkError> {
        self.named_display_file(self.control.welcome_file.clone())
    }

    /// The news screen named by the control manifest.
    pub fn news(&mut self) -> Result<Option<String>, QwkError> {
        self.named_display_file(self.control.news_file.clone())
    }

    /// The goodbye screen named by the control manifest.
    pub fn goodbye(&mut self) -> Result<Option<String>, QwkError> {
        self.named_display_file(self.control.goodbye_file.clone())
    }

    /// Any optional entry, decoded as CP437 text.
    pub fn optional_text(&mut self, name: &str) -> Result<Option<String>, QwkError> {
        let Some(archive) = self.archive.as_mut() else {
            return Err(QwkError::Closed);
        };

        Ok(fetch_entry(archive, &mut self.ctx, &self.options, name)?
            .map(|bytes| cp437::decode(&bytes)))
    }

    /// Closes the packet, releasing the archive handle.
    ///
    /// Idempotent: closing twice is a no-op after the first. Parsed state
    /// is dropped; only the validation report survives.
    pub fn close(&mut self) {
        self.archive = None;
        self.messages = None;
        self.door_id = None;
        self.to_reader = None;
        self.to_door = None;
    }

    fn named_display_file(&mut self, name: Option<String>) -> Result<Option<String>, QwkError> {
        match name {
            Some(name) => self.optional_text(&name),
            None => Ok(None),
        }
    }

    fn materialise_messages(&mut self) -> Result<(), QwkError> {
        if self.messages.is_some() {
            return Ok(());
        }

        let Some(archive) = self.archive.as_mut() else {
            return Err(QwkError::Closed);
        };

        if !archive.exists(store::FILE_NAME) {
            self.ctx.error(Anomaly::new(
                AnomalyKind::MissingRequiredField,
                Location::in_file(store::FILE_NAME),
                "message store is missing",
            ))?;
            self.messages = Some(Vec::new());
            return Ok(());
        }

        if let Some(size) = archive.entry_size(store::FILE_NAME) {
            let limit = self.options.max_entry_size();

            if size > limit {
                self.ctx.error(Anomaly::new(
                    AnomalyKind::EntryExceedsSizeLimit,
                    Location::in_file(store::FILE_NAME),
                    format!("{size} bytes exceed the {limit}-byte limit"),
                ))?;
                self.messages = Some(Vec::new());
                return Ok(());
            }
        }

        let reader = archive.open(store::FILE_NAME)?;
        let mut stream = MessageStream::new(reader, &self.options);

        let mut collected = Vec::new();
        let mut raised = None;

        for item in stream.by_ref() {
            match item {
                Ok(message) => collected.push(message),
                Err(error) => {
                    raised = Some(error);
                    break;
                }
            }
        }

        debug!(
            "materialised {} messages ({} bytes)",
            collected.len(),
            stream.bytes_consumed(),
        );

        let report = stream.into_report();
        self.ctx.merge(report);

        if let Some(error) = raised {
            // A raised store error leaves the packet unusable.
            self.close();
            return Err(error);
        }

        self.messages = Some(collected);

        Ok(())
    }
}

/// Reads a whole optional entry, enforcing the per-entry size limit.
fn fetch_entry<A: Archive>(
    archive: &mut A,
    ctx: &mut ValidationContext,
    options: &PacketOptions,
    name: &str,
) -> Result<Option<Vec<u8>>, QwkError> {
    if !archive.exists(name) {
        return Ok(None);
    }

    let limit = options.max_entry_size();

    if let Some(size) = archive.entry_size(name) {
        if size > limit {
            ctx.error(Anomaly::new(
                AnomalyKind::EntryExceedsSizeLimit,
                Location::in_file(name),
                format!("{size} bytes exceed the {limit}-byte limit"),
            ))?;
            return Ok(None);
        }
    }

    let mut bytes = Vec::new();
    archive.open(name)?.take(limit + 1).read_to_end(&mut bytes)?;

    if bytes.len() as u64 > limit {
        ctx.error(Anomaly::new(
            AnomalyKind::EntryExceedsSizeLimit,
            Location::in_file(name),
            format!("entry exceeds the {limit}-byte limit"),
        ))?;
        return Ok(None);
    }

    Ok(Some(bytes))
}
