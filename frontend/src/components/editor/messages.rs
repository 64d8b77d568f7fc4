use common::client::{PublishOutcome, SaveOutcome, SavePublishOutcome, UploadedImage};
use common::editor::{FieldId, ImageTarget, ListOp, ListTarget};
use common::model::DatasetKey;
use common::CmsError;
use serde_json::Value;

pub enum Msg {
    SelectDataset(DatasetKey),
    Reload,
    Loaded {
        generation: u64,
        key: DatasetKey,
        result: Result<Value, CmsError>,
    },
    SetField(FieldId, String),
    Focus(FieldId, u32),
    Caret(FieldId, u32),
    List(ListTarget, ListOp),
    SelectProvider(String),
    SetNewProviderId(String),
    SetNewProviderName(String),
    CreateProvider,
    DeleteProvider(String),
    FilesChosen(ImageTarget, Vec<web_sys::File>),
    UploadFinished {
        target: ImageTarget,
        uploads: Vec<UploadedImage>,
        errors: Vec<CmsError>,
    },
    RemoveImage(ImageTarget, usize),
    SetImageUrl(ImageTarget, String),
    Save,
    SaveAndPublish,
    Publish,
    SaveFinished {
        key: DatasetKey,
        md5: String,
        result: Result<SaveOutcome, CmsError>,
    },
    SavePublishFinished {
        key: DatasetKey,
        md5: String,
        result: Result<SavePublishOutcome, CmsError>,
    },
    PublishFinished(Result<PublishOutcome, CmsError>),
    OpenLinkDialog,
    CloseLinkDialog,
    SetLinkUrl(String),
    SetLinkLabel(String),
    InsertLink,
}
