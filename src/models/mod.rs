//! Data models shared by the parser and the code generator

pub mod options;
pub mod result;

pub use options::{
    Certificate, CertificateType, CurlOptions, FormData, Headers, HttpVersion, Key, KeyType,
    Proxy, UploadData, UploadDataType,
};
pub use result::ConvertResult;
