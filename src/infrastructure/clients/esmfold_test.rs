use anyhow::Result;
use test_utils::folded_pdb_fixture;

use super::EsmFold;

impl EsmFold {
    fn with_url(url: String) -> EsmFold {
        return EsmFold {
            client: reqwest::Client::new(),
            url,
        };
    }
}

#[tokio::test]
async fn it_folds_sequences() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/foldSequence/v1/pdb/")
        .match_body("MKTAYIAKQR")
        .with_status(200)
        .with_body(folded_pdb_fixture())
        .create_async()
        .await;

    let esmfold = EsmFold::with_url(server.url());
    let res = esmfold.fold("MKTAYIAKQR").await?;

    mock.assert_async().await;
    assert_eq!(res.as_deref(), Some(folded_pdb_fixture()));

    return Ok(());
}

#[tokio::test]
async fn it_rejects_bad_status() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/foldSequence/v1/pdb/")
        .with_status(413)
        .create_async()
        .await;

    let esmfold = EsmFold::with_url(server.url());
    let res = esmfold.fold("MKTAYIAKQR").await?;

    mock.assert_async().await;
    assert_eq!(res, None);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_predictions_without_atoms() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/foldSequence/v1/pdb/")
        .with_status(200)
        .with_body("Internal error")
        .create_async()
        .await;

    let esmfold = EsmFold::with_url(server.url());
    let res = esmfold.fold("MKTAYIAKQR").await?;

    mock.assert_async().await;
    assert_eq!(res, None);

    return Ok(());
}
